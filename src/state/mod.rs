//! State module for tracking mirror progress
//!
//! # Components
//!
//! - `DedupRegistry`: a lock-protected membership set of URLs
//! - `CrawlState`: the three independent registries shared by one run

mod registry;

pub use registry::DedupRegistry;

/// Everything a mirror run shares between its concurrent tasks
///
/// The registries are deliberately independent: an asset is marked visited
/// when it is first attempted and processed only once its bytes are on disk,
/// and no invariant ties the two together.
#[derive(Debug, Default)]
pub struct CrawlState {
    /// Pages whose visit has started (cycle breaking over the page graph)
    pub visited_pages: DedupRegistry,

    /// Assets that have been attempted
    pub visited_assets: DedupRegistry,

    /// Assets whose bytes were fully written to disk
    pub processed_urls: DedupRegistry,
}

impl CrawlState {
    /// Creates empty state for a new run
    pub fn new() -> Self {
        Self::default()
    }
}
