//! Link rewriting for offline browsing
//!
//! Once a page's subtree is mirrored, its saved file can be rewritten so that
//! absolute and root-relative references point at the local copies:
//! - `href`/`src` attributes on any tag
//! - `url(...)` inside `style` attributes and `<style>` blocks
//!
//! Pages are streamed through an HTML rewriter, so comments, script bodies
//! and attribute values that merely look like links are left alone.

mod links;

pub use links::{rewrite_css, rewrite_html, PageLocation};

use crate::MirrorError;
use std::path::Path;

/// Rewrites a saved HTML file in place
///
/// # Arguments
///
/// * `html_path` - The saved page, somewhere below `mirror_root`
/// * `mirror_root` - The output directory holding one folder per host
///
/// # Returns
///
/// * `Ok(true)` - The file was rewritten
/// * `Ok(false)` - Not an `.html` file, outside the mirror, or nothing to change
/// * `Err(MirrorError::Filesystem)` - Reading or writing the file failed
/// * `Err(MirrorError::Rewrite)` - The markup could not be streamed through the rewriter
pub fn rewrite_file(html_path: &Path, mirror_root: &Path) -> Result<bool, MirrorError> {
    let is_html = html_path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("html"))
        .unwrap_or(false);
    if !is_html {
        return Ok(false);
    }

    let Some(page) = PageLocation::of(html_path, mirror_root) else {
        tracing::debug!(
            "{} is not inside {}, leaving it alone",
            html_path.display(),
            mirror_root.display()
        );
        return Ok(false);
    };

    let html =
        std::fs::read_to_string(html_path).map_err(|e| MirrorError::filesystem(html_path, e))?;
    let rewritten = rewrite_html(&html, &page)?;
    if rewritten == html {
        return Ok(false);
    }

    std::fs::write(html_path, rewritten).map_err(|e| MirrorError::filesystem(html_path, e))?;
    Ok(true)
}
