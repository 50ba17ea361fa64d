use serde::Deserialize;
use std::path::PathBuf;

/// Default size of the link-handling pool
pub const DEFAULT_MAX_CONCURRENCY: usize = 50;

/// Browser identity sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.85 Safari/537.36";

/// Main configuration structure for a mirror run
///
/// Immutable once the run starts. The root domain is not stored here; it is
/// derived from the seed URL by [`crate::crawler::Mirror::new`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MirrorConfig {
    #[serde(default, rename = "mirror")]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

/// What to download and where to put it
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Directory under which one folder per host is created
    #[serde(default = "default_output_dir", rename = "output-dir")]
    pub output_dir: PathBuf,

    /// File extensions that are never downloaded (e.g. "png", ".jpg")
    #[serde(default, rename = "reject")]
    pub reject_extensions: Vec<String>,

    /// Path fragments (starting with '/') whose URLs are skipped entirely
    #[serde(default, rename = "exclude")]
    pub reject_paths: Vec<String>,

    /// Rewrite saved pages for offline viewing
    #[serde(default, rename = "convert-links")]
    pub convert_links: bool,

    /// Capacity of the shared link-handling pool
    #[serde(default = "default_max_concurrency", rename = "max-concurrency")]
    pub max_concurrency: usize,

    /// Per-download bandwidth cap such as "200k" or "2M"
    #[serde(default, rename = "rate-limit")]
    pub rate_limit: Option<String>,
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent", rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request deadline, body included (seconds)
    #[serde(default = "default_request_timeout", rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// TCP/TLS connect deadline (seconds)
    #[serde(default = "default_connect_timeout", rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl MirrorConfig {
    /// Builds a configuration from the four knobs of the mirror entry point,
    /// leaving everything else at its default.
    pub fn new(reject_extensions: &str, reject_paths: &str, convert_links: bool) -> Self {
        let mut config = Self::default();
        config.crawl.reject_extensions = split_list(reject_extensions);
        config.crawl.reject_paths = split_list(reject_paths);
        config.crawl.convert_links = convert_links;
        config
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            reject_extensions: Vec::new(),
            reject_paths: Vec::new(),
            convert_links: false,
            max_concurrency: default_max_concurrency(),
            rate_limit: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Splits a comma separated flag value, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    10
}
