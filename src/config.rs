//! Environment overrides for network and caching knobs.

use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

/// Bytes requested from the start of a media file when sniffing (`bytes=0-65535`).
pub const DEFAULT_SNIFF_BYTES: usize = 64 * 1024;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
/// Delay before the second-neighbor preload in the viewer.
pub const DEFAULT_PRELOAD_DELAY_MS: u64 = 100;
pub const DEFAULT_METADATA_CACHE: usize = 64;
/// Entries kept by the dimension probe cache.
pub const PROBE_CACHE_ENTRIES: usize = 512;

fn parse_positive<T>(raw: Option<String>) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
}

fn env_positive<T>(key: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    parse_positive(std::env::var(key).ok())
}

pub fn sniff_bytes() -> usize {
    env_positive("REFRACTA_SNIFF_BYTES").unwrap_or(DEFAULT_SNIFF_BYTES)
}

pub fn http_timeout() -> Duration {
    Duration::from_secs(
        env_positive("REFRACTA_HTTP_TIMEOUT_SECS").unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
    )
}

pub fn preload_delay() -> Duration {
    Duration::from_millis(
        env_positive("REFRACTA_PRELOAD_DELAY_MS").unwrap_or(DEFAULT_PRELOAD_DELAY_MS),
    )
}

pub fn metadata_cache_entries() -> NonZeroUsize {
    env_positive::<usize>("REFRACTA_METADATA_CACHE")
        .and_then(NonZeroUsize::new)
        .or(NonZeroUsize::new(DEFAULT_METADATA_CACHE))
        .unwrap_or(NonZeroUsize::MIN)
}
