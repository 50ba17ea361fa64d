//! HTML scanner for discovering references
//!
//! This module finds every reference a page makes that the mirror may need:
//! - `<a href>` links to other pages
//! - `<img src>`, `<script src>` and `<link href>` assets
//! - `url(...)` values inside `style` attributes and `<style>` blocks

use crate::storage::is_html_content_type;
use crate::MirrorError;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Which construct a reference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// `<a href>`; the only kind that can lead to another page
    Anchor,
    Image,
    Script,
    /// `<link href>`
    Link,
    /// `url(...)` inside inline or embedded CSS
    Style,
}

/// A raw reference found on a page, not yet resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveredLink {
    pub reference: String,
    pub kind: LinkKind,
}

impl DiscoveredLink {
    fn new(reference: &str, kind: LinkKind) -> Self {
        Self {
            reference: reference.trim().to_string(),
            kind,
        }
    }
}

/// The `url(...)` pattern shared by the scanner and the link rewriter
pub(crate) fn css_url_regex() -> &'static Regex {
    static CSS_URL: OnceLock<Regex> = OnceLock::new();
    CSS_URL.get_or_init(|| {
        Regex::new(r#"url\(\s*['"]?([^'"()\s]+)['"]?\s*\)"#).expect("valid url() pattern")
    })
}

/// Extracts every `url(...)` target from a CSS fragment
pub fn extract_style_urls(css: &str) -> Vec<String> {
    css_url_regex()
        .captures_iter(css)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Scans a fetched page for references
///
/// # Arguments
///
/// * `url` - The page URL, used in errors
/// * `body` - The response body
/// * `content_type` - The response Content-Type, if the server sent one
///
/// # Returns
///
/// * `Ok(Vec<DiscoveredLink>)` - References in document order, duplicates removed
/// * `Err(MirrorError::Parse)` - The response is not an HTML document
pub fn scan_page(
    url: &str,
    body: &str,
    content_type: Option<&str>,
) -> Result<Vec<DiscoveredLink>, MirrorError> {
    if let Some(content_type) = content_type {
        if !is_scannable(content_type) {
            return Err(MirrorError::Parse {
                url: url.to_string(),
                message: format!("not an HTML document ({})", content_type),
            });
        }
    }

    Ok(scan_html(body))
}

/// Scans an HTML document for references
///
/// # Skipped References
///
/// - Empty values and in-page fragments (`#top`)
/// - `javascript:`, `mailto:`, `tel:` and `data:` URIs
///
/// # Example
///
/// ```
/// use site_mirror::crawler::{scan_html, LinkKind};
///
/// let links = scan_html(r#"<a href="/about">About</a><img src="logo.png">"#);
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[0].reference, "/about");
/// assert_eq!(links[0].kind, LinkKind::Anchor);
/// ```
pub fn scan_html(html: &str) -> Vec<DiscoveredLink> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    let Ok(all) = Selector::parse("*") else {
        return links;
    };

    for element in document.select(&all) {
        let value = element.value();

        let tagged = match value.name() {
            "a" => value.attr("href").map(|r| (r, LinkKind::Anchor)),
            "img" => value.attr("src").map(|r| (r, LinkKind::Image)),
            "script" => value.attr("src").map(|r| (r, LinkKind::Script)),
            "link" => value.attr("href").map(|r| (r, LinkKind::Link)),
            _ => None,
        };
        if let Some((reference, kind)) = tagged {
            links.push(DiscoveredLink::new(reference, kind));
        }

        if let Some(style) = value.attr("style") {
            for reference in extract_style_urls(style) {
                links.push(DiscoveredLink::new(&reference, LinkKind::Style));
            }
        }

        if value.name() == "style" {
            let css: String = element.text().collect();
            for reference in extract_style_urls(&css) {
                links.push(DiscoveredLink::new(&reference, LinkKind::Style));
            }
        }
    }

    let mut seen = HashSet::new();
    links.retain(|link| !should_skip(&link.reference) && seen.insert(link.clone()));
    links
}

fn is_scannable(content_type: &str) -> bool {
    is_html_content_type(content_type) || content_type.to_ascii_lowercase().contains("xhtml")
}

/// Checks whether a raw reference points nowhere the mirror can go
fn should_skip(reference: &str) -> bool {
    if reference.is_empty() || reference.starts_with('#') {
        return true;
    }

    let lower = reference.to_ascii_lowercase();
    ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}
