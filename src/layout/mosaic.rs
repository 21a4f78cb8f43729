//! The mosaic component: binds a container element to a media list and
//! renders justified rows into it.
//!
//! All document mutation happens on the caller's thread. Background work
//! (re-normalizing a replaced media list) reports back over a channel and is
//! applied by [`Mosaic::poll`], tagged with a generation so stale results
//! and results arriving after [`Mosaic::dispose`] are dropped.

use std::sync::Arc;

use futures_util::future::join_all;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::dom::{Document, FrameGate, NodeId};
use crate::layout::justified::{JustifiedLayout, Tile};
use crate::layout::layout_cache::LayoutCache;
use crate::layout::options::{Breakpoint, LayoutOptions, LayoutOptionsUpdate};
use crate::models::{ManifestEntry, MediaItem, RowModel};
use crate::probe::DimensionProbe;

const LOADING_CLASS: &str = "lumosaic-loading";

const PLAY_ICON: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"24\" height=\"24\" \
viewBox=\"0 0 24 24\"><path fill=\"currentColor\" d=\"M12 2a10 10 0 1 0 0 20a10 10 0 0 0 0-20m-2 \
6.5v7l6-3.5z\"/></svg>";

/// Where a mosaic reads its media from.
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// Literal manifest records.
    Items(Vec<ManifestEntry>),
    /// Id of an element whose `img` descendants describe the media. The
    /// element is removed once read.
    Element(String),
}

type NormalizedBatch = (u64, Vec<MediaItem>);

pub struct Mosaic {
    container: NodeId,
    options: LayoutOptions,
    probe: Option<Arc<dyn DimensionProbe>>,
    items: Vec<MediaItem>,
    rows: Vec<RowModel>,
    target_row_height: f64,
    last_bucket: Option<Breakpoint>,
    frame: FrameGate,
    cache: LayoutCache,
    generation: u64,
    result_tx: flume::Sender<NormalizedBatch>,
    result_rx: flume::Receiver<NormalizedBatch>,
    disposed: bool,
}

impl Mosaic {
    /// Attaches to `container_id` and renders once every dimension probe has
    /// settled. Returns `None` when the container does not exist.
    pub async fn init(
        doc: &mut Document,
        container_id: &str,
        source: MediaSource,
        update: LayoutOptionsUpdate,
        probe: Option<Arc<dyn DimensionProbe>>,
    ) -> Option<Self> {
        let Some(container) = doc.get_element_by_id(container_id) else {
            trace!("mosaic container #{} not found", container_id);
            return None;
        };

        let options = LayoutOptions::default().merged(update);
        doc.add_class(container, LOADING_CLASS);

        let entries = match source {
            MediaSource::Items(entries) => entries,
            MediaSource::Element(id) => read_source_element(doc, &id),
        };
        let active_probe = probe
            .clone()
            .filter(|_| options.should_retrieve_width_and_height);
        let items = normalize(entries, active_probe).await;

        let (result_tx, result_rx) = flume::unbounded();
        let mut mosaic = Self {
            container,
            options,
            probe,
            items,
            rows: Vec::new(),
            target_row_height: 0.0,
            last_bucket: None,
            frame: FrameGate::default(),
            cache: LayoutCache::new(),
            generation: 0,
            result_tx,
            result_rx,
            disposed: false,
        };

        if mosaic.options.shuffle_images {
            mosaic.shuffle(doc);
        } else {
            mosaic.render(doc);
        }
        doc.remove_class(container, LOADING_CLASS);

        debug!(
            "mosaic #{} ready: {} items, {} rows",
            container_id,
            mosaic.items.len(),
            mosaic.rows.len()
        );
        Some(mosaic)
    }

    /// Replaces the media list. Normalization runs on the current tokio
    /// runtime and is applied by the next [`poll`](Self::poll); without a
    /// runtime the list is normalized in place, without probing.
    pub fn replace_media(&mut self, entries: Vec<ManifestEntry>) {
        if self.disposed {
            return;
        }
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let probe = self
                    .probe
                    .clone()
                    .filter(|_| self.options.should_retrieve_width_and_height);
                let tx = self.result_tx.clone();
                handle.spawn(async move {
                    let items = normalize(entries, probe).await;
                    let _ = tx.send((generation, items));
                });
            }
            Err(_) => {
                let items = entries
                    .into_iter()
                    .map(MediaItem::from_entry)
                    .filter(|item| !item.is_text())
                    .collect();
                let _ = self.result_tx.send((generation, items));
            }
        }
    }

    /// Applies finished background work. Returns whether the mosaic re-rendered.
    pub fn poll(&mut self, doc: &mut Document) -> bool {
        let mut latest = None;
        while let Ok((generation, items)) = self.result_rx.try_recv() {
            if generation == self.generation {
                latest = Some(items);
            } else {
                trace!("dropping stale media batch {}", generation);
            }
        }

        match latest {
            Some(items) if !self.disposed => {
                self.items = items;
                self.render(doc);
                true
            }
            _ => false,
        }
    }

    pub fn shuffle(&mut self, doc: &mut Document) {
        self.shuffle_with(doc, &mut rand::thread_rng());
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, doc: &mut Document, rng: &mut R) {
        self.items.shuffle(rng);
        self.render(doc);
    }

    pub fn update_options(&mut self, doc: &mut Document, update: LayoutOptionsUpdate) {
        self.options.apply(update);
        self.render(doc);
    }

    /// Stops reacting to resizes and background results.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.frame.cancel();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Notes a size change; the relayout happens on the next animation
    /// frame. Returns whether a frame needs to be scheduled.
    pub fn on_resize(&mut self) -> bool {
        !self.disposed && self.frame.request()
    }

    /// Re-renders if a resize is pending and the breakpoint bucket changed.
    pub fn on_animation_frame(&mut self, doc: &mut Document) -> bool {
        if self.disposed || !self.frame.take() {
            return false;
        }
        let bucket = self.observed_bucket(doc);
        if bucket.is_none() || bucket == self.last_bucket {
            return false;
        }
        trace!(?bucket, "breakpoint changed");
        self.render(doc);
        true
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn rows(&self) -> &[RowModel] {
        &self.rows
    }

    pub fn target_row_height(&self) -> f64 {
        self.target_row_height
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    fn observed_bucket(&self, doc: &Document) -> Option<Breakpoint> {
        let width = if self.options.observe_window_width {
            doc.viewport_width()
        } else {
            doc.client_width(self.container)
        };
        Breakpoint::from_width(width)
    }

    fn layout(&self) -> JustifiedLayout {
        JustifiedLayout::new(
            self.options.gap,
            self.options.max_rows,
            self.options.stretch_last_row,
        )
    }

    fn render(&mut self, doc: &mut Document) {
        if self.disposed || !doc.exists(self.container) {
            return;
        }

        let tiles: Vec<Tile> = self
            .items
            .iter()
            .map(|item| self.options.working_dimensions(item))
            .collect();

        let bucket = self.observed_bucket(doc);
        let container_width = doc.client_width(self.container);
        self.target_row_height = self.options.row_height_ratio(bucket) * container_width;
        self.last_bucket = bucket;

        let layout = self.layout();
        self.rows = self
            .cache
            .compute(&layout, &tiles, container_width, self.target_row_height);

        doc.clear_children(self.container);
        let gap = format!("{}px", self.options.gap);
        let row_count = self.rows.len();

        for (row_idx, row) in self.rows.iter().enumerate() {
            let row_el = doc.create_element("div");
            doc.add_class(row_el, "lumosaic-row");
            doc.set_style(
                row_el,
                "aspect-ratio",
                (container_width / row.height_px).to_string(),
            );
            if row_idx + 1 < row_count {
                doc.set_style(row_el, "margin-bottom", gap.clone());
            }

            for (pos, placed) in row.items.iter().enumerate() {
                let Some(item) = self.items.get(placed.index) else {
                    continue;
                };
                let item_el = doc.create_element("div");
                doc.add_class(item_el, "lumosaic-item");
                let percent = placed.display_w / container_width * 100.0;
                doc.set_style(item_el, "flex-basis", format!("{percent}%"));
                doc.set_style(item_el, "flex-grow", "0");
                doc.set_style(item_el, "flex-shrink", "1");
                if pos + 1 < row.items.len() {
                    doc.set_style(item_el, "margin-right", gap.clone());
                }

                if self.options.play_button_on_video_cover && item.is_video() {
                    let icon = doc.create_element("div");
                    doc.add_class(icon, "lumosaic-play-icon");
                    doc.set_markup(icon, PLAY_ICON);
                    doc.append_child(item_el, icon);
                }

                let img = render_image(doc, item);
                doc.append_child(item_el, img);
                doc.append_child(row_el, item_el);
            }
            doc.append_child(self.container, row_el);
        }

        debug!(
            "rendered {} items into {} rows (width {}, target height {:.1})",
            self.items.len(),
            row_count,
            container_width,
            self.target_row_height
        );
    }
}

fn render_image(doc: &mut Document, item: &MediaItem) -> NodeId {
    let img = doc.create_element("img");
    doc.set_attribute(img, "src", item.preview().unwrap_or_default());
    if let Some(alt) = &item.alt {
        doc.set_attribute(img, "alt", alt.as_str());
    }
    doc.set_attribute(img, "loading", "lazy");
    if let Some(src) = item.src() {
        doc.set_data(img, "src", src);
    }
    if let Some(title) = &item.title {
        doc.set_attribute(img, "title", title.as_str());
    }
    if let Some(exif) = &item.exif {
        match serde_json::to_string(exif) {
            Ok(json) => doc.set_data(img, "exif", json),
            Err(e) => warn!("could not serialize EXIF for {:?}: {}", item.src(), e),
        }
    }
    img
}

/// Leading integer of an attribute value, like `parseInt`.
fn parse_int(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<u32>().ok().map(f64::from)
}

/// Reads `img` descendants of the element `id` into manifest records and
/// removes the element.
fn read_source_element(doc: &mut Document, id: &str) -> Vec<ManifestEntry> {
    let Some(wrapper) = doc.get_element_by_id(id) else {
        warn!("mosaic source element #{} not found", id);
        return Vec::new();
    };

    let entries: Vec<ManifestEntry> = doc
        .descendants_by_tag(wrapper, "img")
        .into_iter()
        .map(|img| {
            let src_attr = doc.attribute(img, "src").map(str::to_string);
            let pick = |data_key: &str, attr: &str| {
                doc.data(img, data_key)
                    .filter(|v| !v.is_empty())
                    .or_else(|| doc.attribute(img, attr))
            };
            ManifestEntry {
                preview: doc
                    .data(img, "preview")
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .or_else(|| src_attr.clone()),
                src: doc
                    .data(img, "src")
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .or(src_attr),
                width: pick("width", "width").and_then(parse_int),
                height: pick("height", "height").and_then(parse_int),
                ..ManifestEntry::default()
            }
        })
        .collect();

    doc.remove(wrapper);
    entries
}

/// Normalizes entries in input order, probing unknown dimensions
/// concurrently when a probe is given. Text entries are not laid out.
async fn normalize(
    entries: Vec<ManifestEntry>,
    probe: Option<Arc<dyn DimensionProbe>>,
) -> Vec<MediaItem> {
    let pending = entries.into_iter().map(|entry| {
        let probe = probe.clone();
        async move {
            let mut item = MediaItem::from_entry(entry);
            if item.has_dimensions() || item.is_text() {
                return item;
            }
            let (Some(probe), Some(src)) = (probe, item.src().map(str::to_string)) else {
                return item;
            };
            match probe.probe(&src).await {
                Ok(dims) if dims.is_known() => {
                    item.width = dims.width;
                    item.height = dims.height;
                }
                Ok(_) => trace!("no dimensions in header of {}", src),
                Err(e) => warn!("could not fetch size for {}: {}", src, e),
            }
            item
        }
    });

    join_all(pending)
        .await
        .into_iter()
        .filter(|item| !item.is_text())
        .collect()
}
