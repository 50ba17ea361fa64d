use crate::crawler::css_url_regex;
use crate::url::INDEX_FILE;
use crate::MirrorError;
use lol_html::html_content::ContentType;
use lol_html::{element, text, HtmlRewriter, Settings};
use regex::Captures;
use std::path::{Path, PathBuf};
use url::Url;

/// Where a page lives inside the mirror
///
/// `dir` holds the path components of the page's directory relative to the
/// mirror root, host first, e.g. `["x.com", "docs"]`.
#[derive(Debug, Clone)]
pub struct PageLocation<'a> {
    pub mirror_root: &'a Path,
    pub dir: Vec<String>,
}

impl<'a> PageLocation<'a> {
    /// Locates `html_path` below `mirror_root`
    ///
    /// Returns `None` when the file is not inside the mirror or not inside a
    /// host directory.
    pub fn of(html_path: &Path, mirror_root: &'a Path) -> Option<Self> {
        let relative = html_path.strip_prefix(mirror_root).ok()?;
        let mut dir: Vec<String> = relative
            .parent()?
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        dir.retain(|c| c != ".");

        if dir.is_empty() {
            return None;
        }

        Some(Self { mirror_root, dir })
    }

    fn host(&self) -> &str {
        &self.dir[0]
    }
}

/// Rewrites every mirrorable reference in an HTML document
///
/// Absolute and protocol-relative URLs, and root-relative paths, become
/// paths relative to the page's own directory. Everything else, comments and
/// script bodies included, is passed through as written.
pub fn rewrite_html(html: &str, page: &PageLocation<'_>) -> Result<String, MirrorError> {
    let mut output = Vec::with_capacity(html.len());
    let mut css = String::new();

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("[href]", |el| {
                    if let Some(local) = el
                        .get_attribute("href")
                        .and_then(|value| local_reference(&value, page))
                    {
                        el.set_attribute("href", &local)?;
                    }
                    Ok(())
                }),
                element!("[src]", |el| {
                    if let Some(local) = el
                        .get_attribute("src")
                        .and_then(|value| local_reference(&value, page))
                    {
                        el.set_attribute("src", &local)?;
                    }
                    Ok(())
                }),
                element!("[style]", |el| {
                    if let Some(style) = el.get_attribute("style") {
                        let rewritten = rewrite_css(&style, page);
                        if rewritten != style {
                            el.set_attribute("style", &rewritten)?;
                        }
                    }
                    Ok(())
                }),
                // <style> text can arrive in several chunks; hold it until
                // the last one so url(...) values are never split.
                text!("style", |chunk| {
                    css.push_str(chunk.as_str());
                    if chunk.last_in_text_node() {
                        chunk.replace(&rewrite_css(&css, page), ContentType::Html);
                        css.clear();
                    } else {
                        chunk.remove();
                    }
                    Ok(())
                }),
            ],
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| MirrorError::Rewrite(e.to_string()))?;
    rewriter
        .end()
        .map_err(|e| MirrorError::Rewrite(e.to_string()))?;

    String::from_utf8(output).map_err(|e| MirrorError::Rewrite(e.to_string()))
}

/// Rewrites `url(...)` references in a CSS fragment
pub fn rewrite_css(css: &str, page: &PageLocation<'_>) -> String {
    css_url_regex()
        .replace_all(css, |caps: &Captures| match local_reference(&caps[1], page) {
            Some(local) => format!("url('{}')", local),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Maps a reference to its relative path inside the mirror
///
/// Returns `None` for references that are left alone.
fn local_reference(reference: &str, page: &PageLocation<'_>) -> Option<String> {
    let reference = reference.trim();
    let lower = reference.to_ascii_lowercase();

    let absolute = if lower.starts_with("http://") || lower.starts_with("https://") {
        Url::parse(reference).ok()?
    } else if reference.starts_with("//") {
        Url::parse(&format!("http:{}", reference)).ok()?
    } else if reference.starts_with('/') {
        Url::parse(&format!("http://{}{}", page.host(), reference)).ok()?
    } else {
        return None;
    };

    let mut target = target_components(&absolute)?;
    prefer_html_variant(page.mirror_root, &mut target);

    let mut local = relative_path(&page.dir, &target)?;
    if let Some(fragment) = absolute.fragment() {
        local.push('#');
        local.push_str(fragment);
    }
    Some(local)
}

/// Path components of the file a URL is saved as, host first
fn target_components(url: &Url) -> Option<Vec<String>> {
    let host = url.host_str().filter(|h| !h.is_empty())?.to_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();

    let mut components = vec![host];
    if let Some((last, dirs)) = segments.split_last() {
        components.extend(dirs.iter().filter(|d| !d.is_empty()).map(|d| d.to_string()));
        if !last.is_empty() {
            components.push(last.to_string());
            return Some(components);
        }
    }

    components.push(INDEX_FILE.to_string());
    Some(components)
}

/// Switches to `<name>.html` when only that variant was saved
fn prefer_html_variant(mirror_root: &Path, target: &mut [String]) {
    let plain: PathBuf = target.iter().fold(mirror_root.to_path_buf(), |p, c| p.join(c));
    if plain.exists() {
        return;
    }

    if let Some(last) = target.last_mut() {
        let candidate = plain.with_file_name(format!("{}.html", last));
        if candidate.is_file() {
            last.push_str(".html");
        }
    }
}

/// Relative path from directory `from` to file `to`, both below one root
fn relative_path(from: &[String], to: &[String]) -> Option<String> {
    let from: PathBuf = from.iter().collect();
    let to: PathBuf = to.iter().collect();
    let diff = pathdiff::diff_paths(to, from)?;

    let parts: Vec<String> = diff
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
