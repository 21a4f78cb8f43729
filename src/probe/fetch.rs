//! Range fetchers: obtain the first bytes of a media resource.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::header::RANGE;
use reqwest::Url;
use tokio::io::AsyncReadExt;
use tracing::{debug, trace};

use crate::config;
use crate::error::ProbeError;

static SHARED_CLIENT: OnceCell<reqwest::Client> = OnceCell::new();

fn shared_client() -> Result<reqwest::Client, ProbeError> {
    SHARED_CLIENT
        .get_or_try_init(|| {
            reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::limited(10))
                .user_agent(concat!("refracta/", env!("CARGO_PKG_VERSION")))
                .timeout(config::http_timeout())
                .build()
        })
        .cloned()
        .map_err(ProbeError::Client)
}

#[async_trait]
pub trait RangeFetcher: Send + Sync {
    /// Returns at most `len` bytes from the start of `url`.
    async fn fetch_prefix(&self, url: &str, len: usize) -> Result<Vec<u8>, ProbeError>;
}

/// Fetches prefixes over HTTP with a `Range: bytes=0-N` request.
/// Relative URLs are resolved against the base URL.
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl HttpFetcher {
    pub fn new(base_url: Option<&str>) -> Result<Self, ProbeError> {
        let base_url = base_url
            .map(|raw| {
                // Without a trailing slash `join` would replace the last segment.
                let normalized = if raw.ends_with('/') {
                    raw.to_string()
                } else {
                    format!("{raw}/")
                };
                Url::parse(&normalized).map_err(|e| ProbeError::InvalidUrl {
                    url: raw.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;
        Ok(Self {
            client: shared_client()?,
            base_url,
        })
    }

    pub fn resolve(&self, url: &str) -> Result<Url, ProbeError> {
        let invalid = |reason: String| ProbeError::InvalidUrl {
            url: url.to_string(),
            reason,
        };
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(_) => match &self.base_url {
                Some(base) => base
                    .join(url.trim_start_matches('/'))
                    .map_err(|e| invalid(e.to_string())),
                None => Err(invalid("relative url without a base url".into())),
            },
        }
    }
}

#[async_trait]
impl RangeFetcher for HttpFetcher {
    async fn fetch_prefix(&self, url: &str, len: usize) -> Result<Vec<u8>, ProbeError> {
        let resolved = self.resolve(url)?;
        trace!("GET {} bytes=0-{}", resolved, len.saturating_sub(1));

        let mut response = self
            .client
            .get(resolved)
            .header(RANGE, format!("bytes=0-{}", len.saturating_sub(1)))
            .send()
            .await
            .map_err(|source| ProbeError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Servers that ignore Range answer 200 with the whole file, so stop
        // reading once the prefix is complete and drop the connection.
        let mut bytes = Vec::with_capacity(len.min(config::DEFAULT_SNIFF_BYTES));
        while bytes.len() < len {
            let chunk = response.chunk().await.map_err(|source| ProbeError::Fetch {
                url: url.to_string(),
                source,
            })?;
            let Some(chunk) = chunk else { break };
            let take = chunk.len().min(len - bytes.len());
            bytes.extend_from_slice(&chunk[..take]);
        }
        debug!("fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

/// Reads prefixes from a local media root; URLs are treated as paths under it.
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, url: &str) -> Result<PathBuf, ProbeError> {
        let path_part = url.split(['?', '#']).next().unwrap_or_default();
        let relative = Path::new(path_part.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(ProbeError::InvalidUrl {
                url: url.to_string(),
                reason: "path escapes the media root".into(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl RangeFetcher for FileFetcher {
    async fn fetch_prefix(&self, url: &str, len: usize) -> Result<Vec<u8>, ProbeError> {
        let path = self.resolve(url)?;
        let io_err = |source| ProbeError::Io {
            path: path.clone(),
            source,
        };
        let file = tokio::fs::File::open(&path).await.map_err(io_err)?;
        let mut bytes = Vec::with_capacity(len.min(config::DEFAULT_SNIFF_BYTES));
        file.take(len as u64)
            .read_to_end(&mut bytes)
            .await
            .map_err(io_err)?;
        trace!("read {} bytes from {:?}", bytes.len(), path);
        Ok(bytes)
    }
}
