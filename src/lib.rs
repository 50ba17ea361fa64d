//! Site-Mirror: a recursive website mirroring engine
//!
//! This crate crawls every page reachable from a seed URL on the seed's own
//! host, downloads the assets those pages reference, and optionally rewrites
//! the saved pages so they can be browsed offline.

pub mod config;
pub mod crawler;
pub mod output;
pub mod rewrite;
pub mod state;
pub mod storage;
pub mod throttle;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not extract domain from {url}")]
    DomainExtraction { url: String },

    #[error("HTTP error for {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("Failed reading body of {url}: {source}")]
    Body {
        url: String,
        source: std::io::Error,
    },

    #[error("Unexpected status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid rate limit '{0}', expected e.g. 400k or 2M")]
    InvalidRateLimit(String),

    #[error("Link rewrite failed: {0}")]
    Rewrite(String),

    #[error("Mirror run was cancelled")]
    Cancelled,

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MirrorError {
    /// Wraps an IO error with the path it happened at
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::MirrorConfig;
pub use crawler::{mirror, mirror_blocking, CancelToken, Mirror};
pub use output::{MirrorSummary, ProgressSink};
pub use url::{extract_domain, resolve_url};
