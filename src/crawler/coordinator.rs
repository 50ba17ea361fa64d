//! Mirror coordinator - run setup and orchestration
//!
//! This module owns the context shared by every task of a run:
//! - The validated configuration and the root domain
//! - The HTTP client and the bounded link-handling pool
//! - The dedup registries
//! - Progress reporting and cancellation

use super::cancel::CancelToken;
use super::fetcher::build_http_client;
use crate::config::{validate, MirrorConfig};
use crate::output::{MirrorSummary, NoProgress, ProgressSink};
use crate::state::CrawlState;
use crate::throttle::parse_rate;
use crate::url::extract_domain;
use crate::MirrorError;
use chrono::Local;
use reqwest::Client;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// One mirror run
///
/// A `Mirror` is created per seed and shared behind an [`Arc`] by every task
/// the run spawns. Nothing about a run lives in globals, so independent runs
/// can proceed side by side in one process.
pub struct Mirror {
    pub(super) config: MirrorConfig,
    pub(super) seed: String,
    pub(super) root_domain: String,
    pub(super) client: Client,
    pub(super) state: CrawlState,
    pub(super) pool: Arc<Semaphore>,
    pub(super) rate_limit: Option<u64>,
    pub(super) root_forced: AtomicBool,
    pub(super) progress: Arc<dyn ProgressSink>,
    pub(super) cancel: CancelToken,
}

impl Mirror {
    /// Prepares a run for `seed`
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute URL of the first page to visit
    /// * `config` - The mirror configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Mirror)` - Ready to [`run`](Mirror::run)
    /// * `Err(MirrorError::DomainExtraction)` - The seed has no usable host
    /// * `Err(MirrorError)` - Invalid configuration or HTTP client setup failure
    pub fn new(seed: &str, config: MirrorConfig) -> Result<Self, MirrorError> {
        validate(&config)?;

        let root_domain = extract_domain(seed)?;
        let rate_limit = config
            .crawl
            .rate_limit
            .as_deref()
            .map(parse_rate)
            .transpose()?;

        let client = build_http_client(&config.http).map_err(|source| MirrorError::Fetch {
            url: seed.to_string(),
            source,
        })?;

        Ok(Self {
            pool: Arc::new(Semaphore::new(config.crawl.max_concurrency)),
            config,
            seed: seed.to_string(),
            root_domain,
            client,
            state: CrawlState::new(),
            rate_limit,
            root_forced: AtomicBool::new(false),
            progress: Arc::new(NoProgress),
            cancel: CancelToken::new(),
        })
    }

    /// Reports download progress to `sink`
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Uses an externally owned cancellation token
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle that stops the run when cancelled
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.crawl.output_dir
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Mirrors everything reachable from the seed
    ///
    /// Returns once every task of the run has finished. Failures below the
    /// seed only end their own branch; they are logged and reflected in the
    /// summary counts.
    pub async fn run(self: Arc<Self>) -> Result<MirrorSummary, MirrorError> {
        let started_at = Local::now();
        tracing::info!(
            "Mirroring {} into {} (root domain {})",
            self.seed,
            self.output_dir().display(),
            self.root_domain
        );

        match Arc::clone(&self).visit(self.seed.clone()).await {
            Ok(()) => {}
            Err(e @ MirrorError::DomainExtraction { .. }) => return Err(e),
            Err(MirrorError::Cancelled) => tracing::warn!("Mirror of {} cancelled", self.seed),
            Err(e) => tracing::error!("Could not mirror seed page {}: {}", self.seed, e),
        }

        let summary = MirrorSummary::from_state(
            &self.seed,
            &self.root_domain,
            self.output_dir().to_path_buf(),
            &self.state,
            started_at,
            self.cancel.is_cancelled(),
        );

        tracing::info!(
            "Mirror of {} finished: {} pages visited, {} of {} assets saved",
            self.seed,
            summary.pages_visited,
            summary.assets_saved,
            summary.assets_attempted
        );

        Ok(summary)
    }
}

/// Mirrors a site and waits for the whole run to finish
///
/// # Arguments
///
/// * `seed` - Absolute URL of the first page to visit
/// * `config` - The mirror configuration
///
/// # Returns
///
/// * `Ok(MirrorSummary)` - The run completed (possibly with failed branches)
/// * `Err(MirrorError)` - The run could not start
pub async fn mirror(seed: &str, config: MirrorConfig) -> Result<MirrorSummary, MirrorError> {
    let mirror = Arc::new(Mirror::new(seed, config)?);
    mirror.run().await
}

/// Blocking variant of [`mirror`] that drives its own runtime
///
/// Must not be called from inside an async context.
pub fn mirror_blocking(seed: &str, config: MirrorConfig) -> Result<MirrorSummary, MirrorError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(mirror(seed, config))
}
