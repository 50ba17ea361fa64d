//! Output module for reporting on a mirror run
//!
//! This module handles:
//! - Per-chunk progress callbacks for downloads in flight
//! - The summary printed once a run has finished

mod progress;
pub mod stats;

pub use progress::{NoProgress, ProgressSink, TraceProgress};
pub use stats::{print_summary, MirrorSummary};
