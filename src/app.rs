use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use futures_util::future::join_all;
use pico_args::Arguments;
use tracing::{debug, info};

use crate::album::{AlbumManifest, AlbumOptions, AlbumPage};
use crate::dom::{to_html, Document};
use crate::layout::LayoutOptionsUpdate;
use crate::probe::{DimensionProbe, FileFetcher, HttpFetcher, RangeFetcher, RemoteSniffer};

pub const USAGE: &str = "\
refracta: justified gallery layout and dimension sniffing

USAGE:
  refracta layout <manifest.json> [--width PX] [--options FILE] [--html]
                  [--media-root DIR | --base-url URL] [--media-base PREFIX]
  refracta sniff <path-or-url>... [--media-root DIR | --base-url URL]

OPTIONS:
  --width PX          Viewport width used for the layout [default: 1280]
  --options FILE      Layout options as JSON
  --html              Print the rendered page instead of a row summary
  --media-root DIR    Read media prefixes from a local directory
  --base-url URL      Fetch media prefixes over HTTP, resolving relative paths
  --media-base PREFIX Prefix joined to every manifest src/preview
  -h, --help          Print this help
";

const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;

/// Where media bytes come from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaArgs {
    pub media_root: Option<PathBuf>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutArgs {
    pub manifest: PathBuf,
    pub width: f64,
    pub options: Option<PathBuf>,
    pub html: bool,
    pub media_base: Option<String>,
    pub media: MediaArgs,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Layout(LayoutArgs),
    Sniff { targets: Vec<String>, media: MediaArgs },
    Help,
}

pub struct RefractaApp {
    command: Command,
}

impl RefractaApp {
    pub fn from_env() -> Result<Self> {
        Self::from_args(Arguments::from_env())
    }

    pub fn from_args(mut args: Arguments) -> Result<Self> {
        if args.contains(["-h", "--help"]) {
            return Ok(Self {
                command: Command::Help,
            });
        }

        let media = MediaArgs {
            media_root: args.opt_value_from_str("--media-root")?,
            base_url: args.opt_value_from_str("--base-url")?,
        };
        if media.media_root.is_some() && media.base_url.is_some() {
            bail!("--media-root and --base-url are mutually exclusive");
        }

        let command = match args.subcommand()?.as_deref() {
            Some("layout") => {
                let width = args
                    .opt_value_from_str("--width")?
                    .unwrap_or(DEFAULT_VIEWPORT_WIDTH);
                if !width.is_finite() || width <= 0.0 {
                    bail!("--width must be positive");
                }
                let options = args.opt_value_from_str("--options")?;
                let media_base = args.opt_value_from_str("--media-base")?;
                let html = args.contains("--html");
                let manifest = args
                    .free_from_str()
                    .context("layout needs a manifest path")?;
                Command::Layout(LayoutArgs {
                    manifest,
                    width,
                    options,
                    html,
                    media_base,
                    media,
                })
            }
            Some("sniff") => {
                let targets: Vec<String> = args
                    .finish()
                    .into_iter()
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .collect();
                if targets.is_empty() {
                    bail!("sniff needs at least one path or url");
                }
                return Ok(Self {
                    command: Command::Sniff { targets, media },
                });
            }
            Some(other) => bail!("unknown command {other:?}\n\n{USAGE}"),
            None => Command::Help,
        };

        let rest = args.finish();
        if !rest.is_empty() {
            bail!("unexpected arguments: {rest:?}");
        }
        Ok(Self { command })
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Runs the command and returns what should be printed.
    pub async fn run(self) -> Result<String> {
        match self.command {
            Command::Help => Ok(USAGE.to_string()),
            Command::Layout(args) => render_layout(&args).await,
            Command::Sniff { targets, media } => sniff_targets(&targets, &media).await,
        }
    }
}

fn layout_fetcher(media: &MediaArgs) -> Result<Option<Arc<dyn RangeFetcher>>> {
    if let Some(root) = &media.media_root {
        return Ok(Some(Arc::new(FileFetcher::new(root))));
    }
    if let Some(base) = &media.base_url {
        let fetcher = HttpFetcher::new(Some(base.as_str())).context("invalid --base-url")?;
        return Ok(Some(Arc::new(fetcher)));
    }
    Ok(None)
}

async fn render_layout(args: &LayoutArgs) -> Result<String> {
    let raw = tokio::fs::read_to_string(&args.manifest)
        .await
        .with_context(|| format!("failed to read manifest {:?}", args.manifest))?;
    let manifest = AlbumManifest::from_json(&raw)
        .with_context(|| format!("failed to parse manifest {:?}", args.manifest))?;

    let layout: LayoutOptionsUpdate = match &args.options {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read options {path:?}"))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse options {path:?}"))?
        }
        None => LayoutOptionsUpdate::default(),
    };

    let probe = layout_fetcher(&args.media)?
        .map(|fetcher| Arc::new(RemoteSniffer::new(fetcher)) as Arc<dyn DimensionProbe>);
    let options = AlbumOptions {
        media_base: args.media_base.clone(),
        layout,
        probe,
        ..AlbumOptions::default()
    };

    let mut doc = Document::new(args.width);
    let body = doc.body();
    let page = AlbumPage::mount(&mut doc, body, &manifest, &options).await;
    info!(
        "laid out {:?} at {}px: {} galleries",
        manifest.title,
        args.width,
        page.gallery_count()
    );

    if args.html {
        let html: Vec<String> = page.blocks().iter().map(|b| to_html(&doc, *b)).collect();
        return Ok(html.join("\n"));
    }
    Ok(row_summary(&doc, &page))
}

fn row_summary(doc: &Document, page: &AlbumPage) -> String {
    let mut out = String::new();
    for index in 0..page.gallery_count() {
        let Some(mosaic) = page.mosaic(index) else {
            continue;
        };
        let id = doc.attribute(mosaic.container(), "id").unwrap_or_default();
        let _ = writeln!(
            out,
            "#{id}: {} items in {} rows (target height {:.1}px)",
            mosaic.items().len(),
            mosaic.rows().len(),
            mosaic.target_row_height()
        );
        for row in mosaic.rows() {
            let _ = write!(out, "  row {}: {:.1}px", row.row_index, row.height_px);
            for placed in &row.items {
                let _ = write!(
                    out,
                    " | {} {:.1}x{:.1}",
                    placed.index, placed.display_w, placed.display_h
                );
            }
            out.push('\n');
        }
    }
    out
}

fn is_url(target: &str) -> bool {
    target.contains("://")
}

async fn sniff_targets(targets: &[String], media: &MediaArgs) -> Result<String> {
    let http: Option<Arc<dyn DimensionProbe>> =
        if media.base_url.is_some() || targets.iter().any(|t| is_url(t)) {
            let fetcher =
                HttpFetcher::new(media.base_url.as_deref()).context("invalid --base-url")?;
            Some(Arc::new(RemoteSniffer::new(Arc::new(fetcher))))
        } else {
            None
        };

    let probes = targets.iter().map(|target| {
        let probe: Arc<dyn DimensionProbe> = match (&media.media_root, &http) {
            (Some(root), _) => Arc::new(RemoteSniffer::new(Arc::new(FileFetcher::new(root)))),
            (None, Some(http)) if is_url(target) || media.base_url.is_some() => http.clone(),
            (None, _) => {
                let root = if Path::new(target).is_absolute() { "/" } else { "." };
                Arc::new(RemoteSniffer::new(Arc::new(FileFetcher::new(root))))
            }
        };
        async move { (target, probe.probe(target).await) }
    });

    let mut out = String::new();
    for (target, result) in join_all(probes).await {
        match result {
            Ok(dims) => {
                debug!("{} -> {:?}", target, dims);
                let _ = writeln!(
                    out,
                    "{target}\t{}\t{}x{}",
                    dims.format.as_str(),
                    dims.width,
                    dims.height
                );
            }
            Err(e) => {
                let _ = writeln!(out, "{target}\terror: {e}");
            }
        }
    }
    Ok(out)
}
