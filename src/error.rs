use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain the leading bytes of a media resource.
///
/// Unsupported or truncated containers are not errors; the sniffer reports
/// them as unknown dimensions instead.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid media url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request for {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to read an album manifest or an options file.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("malformed manifest: {0}")]
    Json(#[from] serde_json::Error),
}
