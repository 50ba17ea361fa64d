//! Asset downloads
//!
//! Every URL the mirror saves, page or not, goes through
//! [`Mirror::download_asset`]. Its dedup and reject checks run before any
//! network traffic, and the file is only ever created fresh.

use super::coordinator::Mirror;
use super::fetcher::fetch_url;
use crate::storage::{host_dir, output_path, AssetWriter};
use crate::throttle::RateLimitedReader;
use crate::url::{has_http_scheme, is_rejected_extension};
use crate::MirrorError;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use url::Url;

const CHUNK_SIZE: usize = 32 * 1024;

/// Why a download was not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not an http or https URL
    NotHttp,
    /// The file extension is on the reject list
    RejectedExtension,
}

/// What became of one asset request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// The URL was already attempted during this run
    AlreadyAttempted,

    /// The reject rules excluded it
    Skipped(SkipReason),

    /// Its bytes were already saved during this run
    AlreadySaved,

    /// A file already exists at its destination and was left untouched
    AlreadyOnDisk(PathBuf),

    /// Written to disk
    Saved { path: PathBuf, bytes: u64 },
}

impl Mirror {
    /// Downloads `url` into the directory of its own host
    ///
    /// See [`Mirror::download_asset_into`].
    pub async fn download_asset(
        &self,
        url: &str,
        explicit_name: Option<&str>,
    ) -> Result<AssetOutcome, MirrorError> {
        let root_dir = Url::parse(url)
            .ok()
            .and_then(|parsed| host_dir(self.output_dir(), &parsed))
            .unwrap_or_else(|| self.output_dir().to_path_buf());

        self.download_asset_into(url, explicit_name, &root_dir).await
    }

    /// Downloads one URL to disk at most once per run
    ///
    /// # Download Flow
    ///
    /// 1. Mark the URL attempted; stop if it already was
    /// 2. Skip non-http URLs and rejected extensions
    /// 3. Stop if its bytes were already saved
    /// 4. GET it; non-2xx statuses and transport errors fail the download
    /// 5. Derive the destination from the URL path and the Content-Type
    /// 6. Leave an existing file alone, otherwise stream the body into a new one
    /// 7. Mark the URL saved
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to download
    /// * `explicit_name` - File name to use instead of the last path segment
    /// * `root_dir` - Directory the URL path is laid out under
    pub async fn download_asset_into(
        &self,
        url: &str,
        explicit_name: Option<&str>,
        root_dir: &Path,
    ) -> Result<AssetOutcome, MirrorError> {
        if !self.state.visited_assets.insert(url) {
            tracing::trace!("Already attempted {}", url);
            return Ok(AssetOutcome::AlreadyAttempted);
        }

        if !has_http_scheme(url) {
            tracing::info!("Invalid URL, skipping: {}", url);
            return Ok(AssetOutcome::Skipped(SkipReason::NotHttp));
        }

        if is_rejected_extension(url, &self.config.crawl.reject_extensions) {
            tracing::info!("Skipping rejected file: {}", url);
            return Ok(AssetOutcome::Skipped(SkipReason::RejectedExtension));
        }

        if self.state.processed_urls.contains(url) {
            return Ok(AssetOutcome::AlreadySaved);
        }

        let parsed = Url::parse(url)?;
        let response = fetch_url(&self.client, url, &self.cancel).await?;
        let path = output_path(
            root_dir,
            &parsed,
            explicit_name,
            response.content_type.as_deref(),
        );

        let Some(mut writer) = AssetWriter::create(&path).await? else {
            tracing::debug!("{} already exists, not overwriting", path.display());
            return Ok(AssetOutcome::AlreadyOnDisk(path));
        };

        tracing::info!("Downloading: {}", url);

        let total = response.content_length;
        let body = response.into_reader();
        let mut reader: Box<dyn AsyncRead + Send + Unpin> = match self.rate_limit {
            Some(rate) => Box::new(RateLimitedReader::new(body, rate)),
            None => Box::new(body),
        };

        let started = Instant::now();
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut downloaded: u64 = 0;

        loop {
            if self.cancel.is_cancelled() {
                tracing::debug!(
                    "Cancelled while downloading {}, {} left incomplete",
                    url,
                    path.display()
                );
                return Err(MirrorError::Cancelled);
            }

            let n = reader
                .read(&mut buffer)
                .await
                .map_err(|source| MirrorError::Body {
                    url: url.to_string(),
                    source,
                })?;
            if n == 0 {
                break;
            }

            writer.write_chunk(&buffer[..n]).await?;
            downloaded += n as u64;
            self.progress.on_chunk(url, downloaded, total, started);
        }

        let bytes = writer.finish().await?;
        self.state.processed_urls.insert(url);
        tracing::info!("Downloaded [{}]: {} ({} bytes)", url, path.display(), bytes);

        Ok(AssetOutcome::Saved { path, bytes })
    }

    /// Runs a download whose failure only ends its own branch
    pub(super) async fn download_logged(&self, url: &str, explicit_name: Option<&str>) {
        match self.download_asset(url, explicit_name).await {
            Ok(_) => {}
            Err(MirrorError::Cancelled) => tracing::debug!("Download of {} cancelled", url),
            Err(e) => tracing::warn!("Failed to download {}: {}", url, e),
        }
    }
}
