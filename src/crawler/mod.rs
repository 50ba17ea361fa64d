//! Crawler module for page visits and asset downloads
//!
//! This module contains the core mirroring logic, including:
//! - HTTP fetching with browser-like headers
//! - HTML scanning for links and style references
//! - Recursive page visits over a bounded task pool
//! - Streaming asset downloads
//! - Run setup, cancellation and the public entry points

mod cancel;
mod coordinator;
mod downloader;
mod fetcher;
mod parser;
mod scheduler;

pub use cancel::CancelToken;
pub use coordinator::{mirror, mirror_blocking, Mirror};
pub use downloader::{AssetOutcome, SkipReason};
pub use fetcher::{build_http_client, fetch_url, BodyReader, FetchedResponse};
pub use parser::{extract_style_urls, scan_html, scan_page, DiscoveredLink, LinkKind};

pub(crate) use parser::css_url_regex;
