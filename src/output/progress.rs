use std::time::Instant;

/// Receives a callback for every chunk written during a download
///
/// Sinks are shared by all concurrent downloads of a run, so implementations
/// must be thread safe and quick; rendering belongs to the caller.
pub trait ProgressSink: Send + Sync {
    /// Called after each chunk of `url` is written
    ///
    /// # Arguments
    ///
    /// * `url` - The asset being downloaded
    /// * `downloaded` - Bytes written so far for this asset
    /// * `total` - Content-Length when the server sent one
    /// * `started` - When this asset's body started streaming
    fn on_chunk(&self, url: &str, downloaded: u64, total: Option<u64>, started: Instant);
}

/// A sink that ignores progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_chunk(&self, _url: &str, _downloaded: u64, _total: Option<u64>, _started: Instant) {}
}

/// A sink that reports each chunk at trace level
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceProgress;

impl ProgressSink for TraceProgress {
    fn on_chunk(&self, url: &str, downloaded: u64, total: Option<u64>, started: Instant) {
        let elapsed = started.elapsed().as_secs_f64();
        let speed = if elapsed > 0.0 {
            downloaded as f64 / elapsed / 1024.0
        } else {
            0.0
        };

        match total {
            Some(total) if total > 0 => tracing::trace!(
                "{}: {:.2} KiB / {:.2} KiB ({:.0}%) {:.2} KiB/s",
                url,
                downloaded as f64 / 1024.0,
                total as f64 / 1024.0,
                downloaded as f64 * 100.0 / total as f64,
                speed
            ),
            _ => tracing::trace!(
                "{}: {:.2} KiB {:.2} KiB/s",
                url,
                downloaded as f64 / 1024.0,
                speed
            ),
        }
    }
}
