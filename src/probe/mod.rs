pub mod fetch;
pub mod metadata;
pub mod sniffer;

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config;
use crate::error::ProbeError;

pub use fetch::{FileFetcher, HttpFetcher, RangeFetcher};
pub use metadata::{parse_exif_bytes, ExifParser, MetadataParser};
pub use sniffer::{sniff_bytes, Dimensions, ImageFormat};

/// Resolves intrinsic dimensions for a media URL.
#[async_trait]
pub trait DimensionProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<Dimensions, ProbeError>;
}

/// Fetches a byte prefix and sniffs the container header.
///
/// Results are cached per URL, including unknown formats, so a gallery
/// re-normalized after `replace_media` does not refetch anything.
pub struct RemoteSniffer {
    fetcher: Arc<dyn RangeFetcher>,
    prefix_len: usize,
    cache: Mutex<LruCache<String, Dimensions>>,
}

impl RemoteSniffer {
    pub fn new(fetcher: Arc<dyn RangeFetcher>) -> Self {
        let capacity = NonZeroUsize::new(config::PROBE_CACHE_ENTRIES).unwrap_or(NonZeroUsize::MIN);
        Self {
            fetcher,
            prefix_len: config::sniff_bytes(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    #[cfg(test)]
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }
}

#[async_trait]
impl DimensionProbe for RemoteSniffer {
    async fn probe(&self, url: &str) -> Result<Dimensions, ProbeError> {
        if let Some(dims) = self.cache.lock().get(url) {
            trace!("probe cache hit for {}", url);
            return Ok(*dims);
        }

        let bytes = self.fetcher.fetch_prefix(url, self.prefix_len).await?;
        let dims = sniff_bytes(&bytes);
        debug!(
            "sniffed {} as {} {}x{}",
            url,
            dims.format.as_str(),
            dims.width,
            dims.height
        );

        self.cache.lock().put(url.to_string(), dims);
        Ok(dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        bytes: Vec<u8>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RangeFetcher for CountingFetcher {
        async fn fetch_prefix(&self, _url: &str, len: usize) -> Result<Vec<u8>, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.bytes[..self.bytes.len().min(len)].to_vec())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl RangeFetcher for FailingFetcher {
        async fn fetch_prefix(&self, url: &str, _len: usize) -> Result<Vec<u8>, ProbeError> {
            Err(ProbeError::Http {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes
    }

    #[tokio::test]
    async fn test_remote_sniffer_caches_results() {
        let fetcher = Arc::new(CountingFetcher {
            bytes: png_header(1920, 1080),
            calls: AtomicUsize::new(0),
        });
        let sniffer = RemoteSniffer::new(fetcher.clone());

        let first = sniffer.probe("a.png").await.unwrap();
        assert_eq!((first.width, first.height), (1920, 1080));
        assert_eq!(first.format, ImageFormat::Png);

        sniffer.probe("a.png").await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(sniffer.cached(), 1);
    }

    #[tokio::test]
    async fn test_remote_sniffer_unknown_format_is_not_an_error() {
        let fetcher = Arc::new(CountingFetcher {
            bytes: b"GIF89a....".to_vec(),
            calls: AtomicUsize::new(0),
        });
        let dims = RemoteSniffer::new(fetcher).probe("a.gif").await.unwrap();
        assert_eq!(dims, Dimensions::UNKNOWN);
    }

    #[tokio::test]
    async fn test_remote_sniffer_propagates_fetch_errors() {
        let sniffer = RemoteSniffer::new(Arc::new(FailingFetcher));
        let err = sniffer.probe("gone.jpg").await.unwrap_err();
        assert!(matches!(err, ProbeError::Http { status: 404, .. }));
        assert_eq!(sniffer.cached(), 0);
    }
}
