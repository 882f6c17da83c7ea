use std::time::Duration;

use thiserror::Error;

/// Worker pool size used by the reference deployment.
pub const DEFAULT_POOL_SIZE: usize = 25;

/// Per-request bound for reverse traceroute queries. The remote CGI runs a
/// real traceroute on demand, so responses are slow.
pub const TRACEROUTE_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-request bound for esmond archive lookups.
pub const ARCHIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Averaging window for throughput history, in seconds (one day).
pub const AVERAGING_WINDOW_SECS: u64 = 86_400;

/// Failure of a single HTTP exchange.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build http client: {0}")]
    Client(reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("request to {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Failure to extract structure from a response body.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("traceroute response has no title tag")]
    MissingTitle,

    #[error("traceroute title carries no probe address")]
    MissingProbeAddress,

    #[error("traceroute response has no pre block")]
    MissingHopBlock,

    #[error("archive entry has no metadata-key")]
    MissingMetadataKey,

    #[error("malformed json payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Mistakes in the site table or runner setup. These are fatal at build
/// time, before any command is issued.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed site url {url}: {source}")]
    MalformedSiteUrl { url: String, source: url::ParseError },

    #[error("site url {url} has no host component")]
    MissingHost { url: String },

    #[error("failed to read site table {path}: {source}")]
    SiteTableIo {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse site table {path}: {source}")]
    SiteTableToml {
        path: String,
        source: toml::de::Error,
    },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("map rendering failed: {0}")]
    Render(#[from] plotters::drawing::DrawingAreaErrorKind<std::io::Error>),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
