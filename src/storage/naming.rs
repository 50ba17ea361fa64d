use crate::url::INDEX_FILE;
use std::path::{Path, PathBuf};
use url::Url;

/// Checks whether a Content-Type header value denotes an HTML document
///
/// Parameters such as `; charset=utf-8` are ignored.
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case("text/html"))
        .unwrap_or(false)
}

/// Directory holding everything mirrored from the URL's host
pub fn host_dir(output_dir: &Path, url: &Url) -> Option<PathBuf> {
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(|host| output_dir.join(host.to_lowercase()))
}

/// Computes where an asset is saved
///
/// # Naming Rules
///
/// 1. Directories come from the URL path, below `root_dir`
/// 2. The file name is `explicit_name` if given, else the last path segment
/// 3. An empty path, or one ending in `/`, is saved as `index.html`
/// 4. HTML responses get `.html` appended when the name lacks it
///
/// # Examples
///
/// ```
/// use site_mirror::storage::output_path;
/// use std::path::{Path, PathBuf};
/// use url::Url;
///
/// let url = Url::parse("http://x.com/docs/intro").unwrap();
/// let path = output_path(Path::new("out/x.com"), &url, None, Some("text/html"));
/// assert_eq!(path, PathBuf::from("out/x.com/docs/intro.html"));
/// ```
pub fn output_path(
    root_dir: &Path,
    url: &Url,
    explicit_name: Option<&str>,
    content_type: Option<&str>,
) -> PathBuf {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();

    let (last, dirs) = match segments.split_last() {
        Some((last, dirs)) => (*last, dirs),
        None => ("", &[][..]),
    };

    let mut path = root_dir.to_path_buf();
    for dir in dirs.iter().filter(|d| !d.is_empty()) {
        path.push(dir);
    }

    let mut file_name = match explicit_name {
        Some(name) => name.to_string(),
        None if last.is_empty() => INDEX_FILE.to_string(),
        None => last.to_string(),
    };

    if content_type.map(is_html_content_type).unwrap_or(false) && !file_name.ends_with(".html") {
        file_name.push_str(".html");
    }

    path.push(file_name);
    path
}

/// Where a URL lives inside the mirror, before any content-type suffix
///
/// Returns `None` for strings that do not parse or have no host.
pub fn local_path(output_dir: &Path, url: &str) -> Option<PathBuf> {
    let parsed = Url::parse(url).ok()?;
    let root = host_dir(output_dir, &parsed)?;
    Some(output_path(&root, &parsed, None, None))
}
