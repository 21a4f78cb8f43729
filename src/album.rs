//! Album pages: a manifest split into gallery sections separated by heading
//! and text blocks, each gallery with its own mosaic and viewer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dom::{Document, NodeId};
use crate::error::ManifestError;
use crate::layout::{LayoutOptionsUpdate, MediaSource, Mosaic};
use crate::models::{EntryKind, ManifestEntry};
use crate::probe::{DimensionProbe, MetadataParser};
use crate::ui::{InputEvent, Viewer, ViewerOptionsUpdate, ViewerSource};

/// Header date format, e.g. `Jun 01, '24`.
const DATE_FORMAT: &str = "%b %d, '%y";

/// An album as the backend stores it. Access lists and other backend-only
/// keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumManifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub subtitle: String,
    /// Unix timestamp of the album date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    pub images: Vec<ManifestEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestShape {
    Bare(Vec<ManifestEntry>),
    Album(AlbumManifest),
}

impl AlbumManifest {
    /// Parses an album object, or a bare array of entries as an untitled
    /// album.
    pub fn from_json(raw: &str) -> Result<Self, ManifestError> {
        Ok(match serde_json::from_str(raw)? {
            ManifestShape::Bare(images) => Self {
                images,
                ..Self::default()
            },
            ManifestShape::Album(album) => album,
        })
    }

    pub fn formatted_date(&self) -> Option<String> {
        let date = chrono::DateTime::from_timestamp(self.date?, 0)?;
        Some(date.format(DATE_FORMAT).to_string())
    }
}

/// One block of an album page.
#[derive(Debug, Clone, PartialEq)]
pub enum AlbumSection {
    Gallery(Vec<ManifestEntry>),
    Title(String),
    Text(String),
}

fn prefixed(base: Option<&str>, value: Option<String>) -> Option<String> {
    match (base, value) {
        (Some(base), Some(v)) if !v.is_empty() => {
            Some(format!("{}/{}", base.trim_end_matches('/'), v))
        }
        (_, value) => value,
    }
}

/// Groups consecutive media entries into galleries; title and text entries
/// become standalone sections. Untyped entries with a source count as
/// media. `src` and `preview` are prefixed with `media_base` when given.
pub fn split_sections(entries: &[ManifestEntry], media_base: Option<&str>) -> Vec<AlbumSection> {
    let mut sections = Vec::new();
    let mut pending: Vec<ManifestEntry> = Vec::new();

    for entry in entries {
        let is_media = match entry.kind() {
            EntryKind::Image | EntryKind::Video => true,
            EntryKind::Unknown => {
                entry.src.is_some() || entry.url.is_some() || entry.preview.is_some()
            }
            EntryKind::Title | EntryKind::Text => false,
        };
        if is_media {
            let mut entry = entry.clone();
            entry.src = prefixed(media_base, entry.src);
            entry.preview = prefixed(media_base, entry.preview);
            pending.push(entry);
            continue;
        }

        let text = entry.text.clone().unwrap_or_default();
        let section = match entry.kind() {
            EntryKind::Title => AlbumSection::Title(text),
            EntryKind::Text => AlbumSection::Text(text),
            _ => {
                trace!("skipping album entry without source or type");
                continue;
            }
        };
        if !pending.is_empty() {
            sections.push(AlbumSection::Gallery(std::mem::take(&mut pending)));
        }
        sections.push(section);
    }

    if !pending.is_empty() {
        sections.push(AlbumSection::Gallery(pending));
    }
    sections
}

/// Mount-time settings for an album page.
#[derive(Clone, Default)]
pub struct AlbumOptions {
    /// Prefix for relative media paths.
    pub media_base: Option<String>,
    pub layout: LayoutOptionsUpdate,
    /// Viewer settings; the counter and thumbnails are always off inline.
    pub viewer: ViewerOptionsUpdate,
    pub probe: Option<Arc<dyn DimensionProbe>>,
    pub metadata: Option<Arc<dyn MetadataParser>>,
}

struct AlbumGallery {
    mosaic: Mosaic,
    viewer: Option<Viewer>,
}

/// A mounted album: header, inline blocks and one mosaic plus viewer per
/// gallery section.
pub struct AlbumPage {
    blocks: Vec<NodeId>,
    galleries: Vec<AlbumGallery>,
}

impl AlbumPage {
    pub async fn mount(
        doc: &mut Document,
        parent: NodeId,
        manifest: &AlbumManifest,
        options: &AlbumOptions,
    ) -> Self {
        if let Some(theme) = manifest.theme.as_deref().filter(|t| !t.is_empty()) {
            doc.add_class(parent, &format!("theme-{theme}"));
        }

        let mut blocks = vec![mount_header(doc, parent, manifest)];
        let mut gallery_ids = Vec::new();
        let sections = split_sections(&manifest.images, options.media_base.as_deref());

        for section in sections {
            let block = doc.create_element("div");
            match section {
                AlbumSection::Gallery(entries) => {
                    let id = format!("lumosaic-{}", gallery_ids.len());
                    doc.set_attribute(block, "id", id.as_str());
                    doc.add_class(block, "album-inline-gallery");
                    gallery_ids.push((id, entries));
                }
                AlbumSection::Title(text) => {
                    doc.add_class(block, "album-inline-title");
                    doc.add_class(block, "scaled");
                    let heading = doc.create_element("h2");
                    doc.set_markup(heading, text);
                    doc.append_child(block, heading);
                }
                AlbumSection::Text(text) => {
                    doc.add_class(block, "album-inline-text");
                    doc.add_class(block, "scaled");
                    let para = doc.create_element("p");
                    doc.set_markup(para, text);
                    doc.append_child(block, para);
                }
            }
            doc.append_child(parent, block);
            blocks.push(block);
        }

        let viewer_options = ViewerOptionsUpdate {
            counter: Some(false),
            thumbnails: Some(false),
            ..options.viewer.clone()
        };
        let mut galleries = Vec::new();
        for (id, entries) in gallery_ids {
            let Some(mosaic) = Mosaic::init(
                doc,
                &id,
                MediaSource::Items(entries),
                options.layout.clone(),
                options.probe.clone(),
            )
            .await
            else {
                continue;
            };
            let viewer = Viewer::init(
                doc,
                ViewerSource::selector(&id),
                viewer_options.clone(),
                options.metadata.clone(),
            );
            galleries.push(AlbumGallery { mosaic, viewer });
        }

        debug!(
            "mounted album {:?}: {} galleries, {} blocks",
            manifest.title,
            galleries.len(),
            blocks.len()
        );
        Self { blocks, galleries }
    }

    /// Header, gallery and text blocks in page order.
    pub fn blocks(&self) -> &[NodeId] {
        &self.blocks
    }

    pub fn gallery_count(&self) -> usize {
        self.galleries.len()
    }

    pub fn mosaic(&self, index: usize) -> Option<&Mosaic> {
        self.galleries.get(index).map(|g| &g.mosaic)
    }

    pub fn viewer(&self, index: usize) -> Option<&Viewer> {
        self.galleries.get(index).and_then(|g| g.viewer.as_ref())
    }

    /// Returns whether any mosaic needs an animation frame.
    pub fn on_resize(&mut self) -> bool {
        let mut requested = false;
        for gallery in &mut self.galleries {
            requested |= gallery.mosaic.on_resize();
        }
        requested
    }

    pub fn on_animation_frame(&mut self, doc: &mut Document) -> bool {
        let mut changed = false;
        for gallery in &mut self.galleries {
            if gallery.mosaic.on_animation_frame(doc) {
                if let Some(viewer) = &mut gallery.viewer {
                    viewer.refresh_elements(doc);
                }
                changed = true;
            }
            if let Some(viewer) = &mut gallery.viewer {
                changed |= viewer.on_animation_frame(doc);
            }
        }
        changed
    }

    pub fn poll(&mut self, doc: &mut Document) -> bool {
        let mut changed = false;
        for gallery in &mut self.galleries {
            if gallery.mosaic.poll(doc) {
                if let Some(viewer) = &mut gallery.viewer {
                    viewer.refresh_elements(doc);
                }
                changed = true;
            }
            if let Some(viewer) = &mut gallery.viewer {
                changed |= viewer.poll(doc);
            }
        }
        changed
    }

    /// Offers the event to each viewer until one consumes it.
    pub fn handle_event(&mut self, doc: &mut Document, event: InputEvent) -> bool {
        self.galleries
            .iter_mut()
            .filter_map(|g| g.viewer.as_mut())
            .any(|viewer| viewer.handle_event(doc, event.clone()))
    }

    /// Tears down viewers and mosaics and removes the page blocks.
    pub fn unmount(mut self, doc: &mut Document) {
        for gallery in &mut self.galleries {
            gallery.mosaic.dispose();
            if let Some(viewer) = &mut gallery.viewer {
                viewer.destroy(doc);
            }
        }
        for block in self.blocks.drain(..) {
            doc.remove(block);
        }
    }
}

fn mount_header(doc: &mut Document, parent: NodeId, manifest: &AlbumManifest) -> NodeId {
    let header = doc.create_element("div");
    doc.add_class(header, "album-title");
    doc.add_class(header, "scaled");
    let lines = [
        ("h1", Some(manifest.title.clone())),
        ("h2", Some(manifest.subtitle.clone())),
        ("h3", manifest.formatted_date()),
    ];
    for (tag, text) in lines {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            continue;
        };
        let line = doc.create_element(tag);
        doc.set_text(line, text);
        doc.append_child(header, line);
    }
    doc.append_child(parent, header);
    header
}
