use crate::url::resolve::path_of;

/// Checks whether a URL uses the http or https scheme
pub fn has_http_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Checks whether a URL ends in one of the rejected extensions
///
/// Extensions may be given with or without the leading dot and match
/// case-insensitively against the URL with its query and fragment removed.
///
/// # Examples
///
/// ```
/// use site_mirror::url::is_rejected_extension;
///
/// let reject = vec!["png".to_string(), ".JPG".to_string()];
/// assert!(is_rejected_extension("http://x.com/a/logo.png", &reject));
/// assert!(is_rejected_extension("http://x.com/photo.jpg?w=200", &reject));
/// assert!(!is_rejected_extension("http://x.com/style.css", &reject));
/// ```
pub fn is_rejected_extension(url: &str, reject_extensions: &[String]) -> bool {
    if reject_extensions.is_empty() {
        return false;
    }

    let end = url.find(['?', '#']).unwrap_or(url.len());
    let target = url[..end].to_ascii_lowercase();

    reject_extensions.iter().any(|extension| {
        let extension = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        !extension.is_empty() && target.ends_with(&format!(".{}", extension))
    })
}

/// Checks whether a URL's path contains one of the excluded path patterns
///
/// Only patterns starting with `/` take part; the host is never matched.
///
/// # Examples
///
/// ```
/// use site_mirror::url::is_rejected_path;
///
/// let exclude = vec!["/private".to_string()];
/// assert!(is_rejected_path("http://x.com/private/a.html", &exclude));
/// assert!(!is_rejected_path("http://private.com/a.html", &exclude));
/// ```
pub fn is_rejected_path(url: &str, reject_paths: &[String]) -> bool {
    if reject_paths.is_empty() {
        return false;
    }

    let path = path_of(url);
    reject_paths
        .iter()
        .filter(|pattern| pattern.starts_with('/'))
        .any(|pattern| path.contains(pattern.as_str()))
}
