//! End-of-run summary
//!
//! The summary is derived from the run's dedup registries once every task
//! has finished; nothing is counted while the crawl is in flight.

use crate::state::CrawlState;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;

/// What one mirror run did
#[derive(Debug, Clone)]
pub struct MirrorSummary {
    /// The seed URL the run started from
    pub seed: String,

    /// Host whose pages were expanded
    pub root_domain: String,

    /// Directory holding one folder per mirrored host
    pub output_dir: PathBuf,

    /// Pages whose visit started
    pub pages_visited: usize,

    /// Assets that were attempted (including skips and failures)
    pub assets_attempted: usize,

    /// Assets whose bytes are on disk
    pub assets_saved: usize,

    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,

    /// Whether the run stopped early because it was cancelled
    pub cancelled: bool,
}

impl MirrorSummary {
    /// Builds a summary from the state of a finished run
    pub fn from_state(
        seed: &str,
        root_domain: &str,
        output_dir: PathBuf,
        state: &CrawlState,
        started_at: DateTime<Local>,
        cancelled: bool,
    ) -> Self {
        Self {
            seed: seed.to_string(),
            root_domain: root_domain.to_string(),
            output_dir,
            pages_visited: state.visited_pages.len(),
            assets_attempted: state.visited_assets.len(),
            assets_saved: state.processed_urls.len(),
            started_at,
            finished_at: Local::now(),
            cancelled,
        }
    }

    /// Wall-clock duration of the run
    pub fn elapsed(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Attempted assets that did not end up on disk
    pub fn assets_not_saved(&self) -> usize {
        self.assets_attempted.saturating_sub(self.assets_saved)
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &MirrorSummary) {
    println!("=== Mirror Summary ===\n");

    println!("Seed: {}", summary.seed);
    println!("Root domain: {}", summary.root_domain);
    println!("Saved under: {}", summary.output_dir.display());
    println!();

    println!("Pages visited: {}", summary.pages_visited);
    println!("Assets attempted: {}", summary.assets_attempted);
    println!("Assets saved: {}", summary.assets_saved);
    println!(
        "Assets skipped or failed: {}",
        summary.assets_not_saved()
    );
    println!();

    println!(
        "Started at: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "Finished at: {}",
        summary.finished_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("Elapsed: {:.1}s", summary.elapsed().as_secs_f64());

    if summary.cancelled {
        println!("\nRun was cancelled before it completed");
    }
}
