/// Resolves a reference found on a page against that page's URL
///
/// # Resolution Rules
///
/// 1. Everything from the first `#` onward is dropped
/// 2. References starting with `http` are already absolute
/// 3. Protocol-relative references (`//host/...`) take the base's scheme
/// 4. `/path` and `./path` are joined to the base's scheme and host
/// 5. Anything else is treated as root-relative: scheme + host + "/" + ref
///
/// Dot segments are never collapsed and document-relative references are
/// not resolved against the base's directory. Both are deliberate
/// simplifications that the rest of the mirror relies on.
///
/// # Examples
///
/// ```
/// use site_mirror::url::resolve_url;
///
/// let base = "https://example.com/blog/post.html";
/// assert_eq!(resolve_url(base, "/css/site.css"), "https://example.com/css/site.css");
/// assert_eq!(resolve_url(base, "img/a.png"), "https://example.com/img/a.png");
/// assert_eq!(resolve_url(base, "//cdn.com/x.js"), "https://cdn.com/x.js");
/// assert_eq!(resolve_url(base, "http://other.com/#top"), "http://other.com/");
/// ```
pub fn resolve_url(base: &str, reference: &str) -> String {
    let reference = match reference.find('#') {
        Some(index) => &reference[..index],
        None => reference,
    };

    if reference.starts_with("http") {
        return reference.to_string();
    }

    if reference.starts_with("//") {
        return format!("{}:{}", scheme_of(base), reference);
    }

    let (origin, _) = split_origin(base);

    if reference.starts_with('/') {
        return format!("{}{}", origin, reference);
    }

    if let Some(rest) = reference.strip_prefix("./") {
        return format!("{}/{}", origin, rest);
    }

    format!("{}/{}", origin, reference)
}

/// Splits a URL into `scheme://authority` and the remainder
///
/// The remainder starts at the first `/`, `?` or `#` after the authority and
/// is empty for bare origins. Strings without `://` are treated as all origin.
pub fn split_origin(url: &str) -> (&str, &str) {
    let Some(scheme_end) = url.find("://") else {
        return (url, "");
    };

    let authority_start = scheme_end + 3;
    let end = url[authority_start..]
        .find(['/', '?', '#'])
        .map(|offset| authority_start + offset)
        .unwrap_or(url.len());

    url.split_at(end)
}

/// Returns the path portion of a URL string, without query or fragment
pub fn path_of(url: &str) -> &str {
    let (_, rest) = split_origin(url);
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

/// Returns the scheme of a URL string, defaulting to `http`
fn scheme_of(url: &str) -> &str {
    match url.find("://") {
        Some(index) if index > 0 => &url[..index],
        _ => "http",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://example.com/dir/page.html";

    #[test]
    fn test_absolute_reference_unchanged() {
        assert_eq!(
            resolve_url(BASE, "https://other.com/a/b.js"),
            "https://other.com/a/b.js"
        );
    }

    #[test]
    fn test_fragment_stripped() {
        assert_eq!(
            resolve_url(BASE, "/about#team"),
            "http://example.com/about"
        );
        assert_eq!(
            resolve_url(BASE, "https://other.com/x#y#z"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_protocol_relative_takes_base_scheme() {
        assert_eq!(
            resolve_url(BASE, "//cdn.example.net/lib.js"),
            "http://cdn.example.net/lib.js"
        );
        assert_eq!(
            resolve_url("https://example.com/", "//cdn.example.net/lib.js"),
            "https://cdn.example.net/lib.js"
        );
    }

    #[test]
    fn test_root_relative() {
        assert_eq!(
            resolve_url(BASE, "/css/site.css"),
            "http://example.com/css/site.css"
        );
    }

    #[test]
    fn test_dot_slash_joins_to_root() {
        assert_eq!(
            resolve_url(BASE, "./img/logo.png"),
            "http://example.com/img/logo.png"
        );
    }

    #[test]
    fn test_bare_reference_is_root_relative() {
        assert_eq!(
            resolve_url(BASE, "other.html"),
            "http://example.com/other.html"
        );
    }

    #[test]
    fn test_dot_segments_kept() {
        assert_eq!(
            resolve_url(BASE, "../up.html"),
            "http://example.com/../up.html"
        );
    }

    #[test]
    fn test_port_preserved() {
        assert_eq!(
            resolve_url("http://127.0.0.1:8080/a/b", "/c"),
            "http://127.0.0.1:8080/c"
        );
    }

    #[test]
    fn test_base_with_query_only() {
        assert_eq!(
            resolve_url("http://example.com?x=1", "/c"),
            "http://example.com/c"
        );
    }

    #[test]
    fn test_split_origin() {
        assert_eq!(
            split_origin("https://example.com:81/a/b?c"),
            ("https://example.com:81", "/a/b?c")
        );
        assert_eq!(split_origin("https://example.com"), ("https://example.com", ""));
        assert_eq!(split_origin("no-scheme"), ("no-scheme", ""));
    }

    #[test]
    fn test_path_of() {
        assert_eq!(path_of("https://example.com/a/b?c=1#d"), "/a/b");
        assert_eq!(path_of("https://example.com"), "");
        assert_eq!(path_of("https://example.com/"), "/");
    }
}
