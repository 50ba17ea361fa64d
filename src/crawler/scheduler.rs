//! Page visits and link dispatch
//!
//! This module handles:
//! - Recursive page visits with per-page join barriers
//! - Bounding concurrent link handlers with the shared pool
//! - Routing each discovered link to a download, a visit, or both
//! - Rewriting a page once its whole subtree has finished

use super::coordinator::Mirror;
use super::fetcher::fetch_url;
use super::parser::{scan_page, DiscoveredLink, LinkKind};
use crate::rewrite::rewrite_file;
use crate::storage::local_path;
use crate::url::{
    denotes_directory, extract_domain, index_url, is_bare_root, is_rejected_path, resolve_url,
    INDEX_FILE,
};
use crate::MirrorError;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::OwnedSemaphorePermit;
use tokio::task::JoinSet;
use tracing::Instrument;

impl Mirror {
    /// Visits one page and everything reachable from it
    ///
    /// # Visit Flow
    ///
    /// 1. Mark the page visited; stop if it already was
    /// 2. The first time the bare site root is seen, save it as `index.html`
    /// 3. Fetch and scan the page
    /// 4. Hand every reference to a link handler, one pool permit each
    /// 5. Wait for all handlers (and therefore all sub-visits) to finish
    /// 6. Rewrite the saved page when link conversion is on
    ///
    /// The returned future resolves only after the whole subtree is done.
    pub fn visit(self: Arc<Self>, url: String) -> BoxFuture<'static, Result<(), MirrorError>> {
        async move {
            let domain = extract_domain(&url)?;

            if !self.state.visited_pages.insert(&url) {
                tracing::trace!("Already visited {}", url);
                return Ok(());
            }

            if self.cancel.is_cancelled() {
                return Err(MirrorError::Cancelled);
            }

            if is_bare_root(&url) && !self.root_forced.swap(true, Ordering::SeqCst) {
                tracing::debug!("Saving site root {} as {}", url, INDEX_FILE);
                self.download_logged(&url, Some(INDEX_FILE)).await;
            }

            tracing::debug!("Visiting page: {} ({})", url, domain);
            let response = fetch_url(&self.client, &url, &self.cancel).await?;
            let content_type = response.content_type.clone();
            let body = response.text().await?;
            let links = scan_page(&url, &body, content_type.as_deref())?;
            drop(body);

            tracing::debug!("Found {} references on {}", links.len(), url);

            let mut handlers = JoinSet::new();
            for link in links {
                if self.cancel.is_cancelled() {
                    break;
                }

                // A permit is held from dispatch until the handler is about
                // to recurse, so at most `max_concurrency` links are in flight.
                let permit = match Arc::clone(&self.pool).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };

                let mirror = Arc::clone(&self);
                let page_url = url.clone();
                handlers.spawn(
                    async move { mirror.handle_link(page_url, link, permit).await }
                        .in_current_span(),
                );
            }

            while let Some(joined) = handlers.join_next().await {
                if let Err(e) = joined {
                    tracing::error!("Link handler on {} did not complete: {}", url, e);
                }
            }

            if self.config.crawl.convert_links {
                self.convert_page(&url).await;
            }

            Ok(())
        }
        .boxed()
    }

    /// Handles one reference found on `page_url`
    ///
    /// Same-domain assets are saved before any sub-visit starts, so a page's
    /// file exists by the time its own visit rewrites it.
    async fn handle_link(
        self: Arc<Self>,
        page_url: String,
        link: DiscoveredLink,
        permit: OwnedSemaphorePermit,
    ) {
        let target = resolve_url(&page_url, &link.reference);

        if is_rejected_path(&target, &self.config.crawl.reject_paths) {
            tracing::info!("Skipping rejected file path: {}", target);
            return;
        }

        let domain = match extract_domain(&target) {
            Ok(domain) => domain,
            Err(e) => {
                tracing::warn!("Dropping reference on {}: {}", page_url, e);
                return;
            }
        };

        // Foreign hosts are saved as leaves and never expanded.
        if domain != self.root_domain {
            self.download_logged(&target, None).await;
            return;
        }

        let next_page = match link.kind {
            LinkKind::Anchor if denotes_directory(&target) => {
                let index = index_url(&target);
                self.download_logged(&index, None).await;
                (!self.state.visited_pages.contains(&index)).then_some(index)
            }
            LinkKind::Anchor => Some(target.clone()),
            _ => None,
        };

        self.download_logged(&target, None).await;

        // Sub-visits may need every permit themselves; holding ours while
        // waiting on them could starve the pool.
        drop(permit);

        if let Some(page) = next_page {
            if let Err(e) = Arc::clone(&self).visit(page.clone()).await {
                match e {
                    MirrorError::Cancelled => tracing::debug!("Visit of {} cancelled", page),
                    e => tracing::warn!("Abandoning page {}: {}", page, e),
                }
            }
        }
    }

    /// Rewrites the saved copy of `url` for offline viewing
    async fn convert_page(&self, url: &str) {
        let Some(path) = self.saved_page_path(url) else {
            tracing::debug!("No saved copy of {} to convert", url);
            return;
        };

        let mirror_root = self.output_dir().to_path_buf();
        let page = path.clone();
        match tokio::task::spawn_blocking(move || rewrite_file(&page, &mirror_root)).await {
            Ok(Ok(true)) => tracing::debug!("Converted links in {}", path.display()),
            Ok(Ok(false)) => {}
            Ok(Err(e)) => tracing::warn!("Could not convert links in {}: {}", path.display(), e),
            Err(e) => tracing::error!("Link conversion for {} did not complete: {}", url, e),
        }
    }

    /// Where the page at `url` ended up on disk, if anywhere
    fn saved_page_path(&self, url: &str) -> Option<PathBuf> {
        let path = local_path(self.output_dir(), url)?;
        if path.is_file() {
            return Some(path);
        }

        let mut with_suffix = path.into_os_string();
        with_suffix.push(".html");
        let with_suffix = PathBuf::from(with_suffix);
        with_suffix.is_file().then_some(with_suffix)
    }
}
