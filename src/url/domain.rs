use crate::url::resolve::path_of;
use crate::MirrorError;
use url::Url;

/// File name used for directory URLs and the forced site root
pub const INDEX_FILE: &str = "index.html";

/// Extracts the lowercase host from a URL string
///
/// # Returns
///
/// * `Ok(String)` - The lowercase domain/host, without port
/// * `Err(MirrorError::DomainExtraction)` - Unparsable URL or no host
///
/// # Examples
///
/// ```
/// use site_mirror::url::extract_domain;
///
/// assert_eq!(extract_domain("https://EXAMPLE.com/path").unwrap(), "example.com");
/// assert_eq!(extract_domain("http://127.0.0.1:8080/").unwrap(), "127.0.0.1");
/// assert!(extract_domain("not a url").is_err());
/// ```
pub fn extract_domain(url: &str) -> Result<String, MirrorError> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_lowercase()))
        .filter(|host| !host.is_empty())
        .ok_or_else(|| MirrorError::DomainExtraction {
            url: url.to_string(),
        })
}

/// Checks whether a URL is the bare root of its site
///
/// `http://x.com`, `http://x.com/` and `http://x.com:8080/` are bare roots;
/// anything with a path or a query is not.
pub fn is_bare_root(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.path() == "/" && parsed.query().is_none(),
        Err(_) => false,
    }
}

/// Checks whether an anchor target names a directory rather than a file
///
/// True for an empty path, a path ending in `/`, and an explicit
/// `/index.html`.
pub fn denotes_directory(url: &str) -> bool {
    let path = path_of(url);
    path.is_empty() || path.ends_with('/') || path.ends_with("/index.html")
}

/// Returns the `index.html` URL implied by a directory URL
///
/// The query string is dropped; a URL already naming `index.html` is kept.
pub fn index_url(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let without_query = &url[..end];

    if path_of(without_query).ends_with("/index.html") {
        return without_query.to_string();
    }

    format!("{}/{}", without_query.trim_end_matches('/'), INDEX_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        assert_eq!(extract_domain("https://example.com/").unwrap(), "example.com");
    }

    #[test]
    fn test_extract_subdomain() {
        assert_eq!(
            extract_domain("https://blog.example.com/post").unwrap(),
            "blog.example.com"
        );
    }

    #[test]
    fn test_extract_with_port() {
        assert_eq!(
            extract_domain("https://example.com:8080/").unwrap(),
            "example.com"
        );
    }

    #[test]
    fn test_extract_mixed_case() {
        assert_eq!(extract_domain("https://Example.COM/").unwrap(), "example.com");
    }

    #[test]
    fn test_extract_failure_reports_url() {
        match extract_domain("::nope::") {
            Err(MirrorError::DomainExtraction { url }) => assert_eq!(url, "::nope::"),
            other => panic!("expected DomainExtraction, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_hostless_url() {
        assert!(extract_domain("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_is_bare_root() {
        assert!(is_bare_root("http://example.com"));
        assert!(is_bare_root("http://example.com/"));
        assert!(is_bare_root("http://127.0.0.1:3000/"));
        assert!(!is_bare_root("http://example.com/about"));
        assert!(!is_bare_root("http://example.com/?page=2"));
        assert!(!is_bare_root("not a url"));
    }

    #[test]
    fn test_denotes_directory() {
        assert!(denotes_directory("http://example.com"));
        assert!(denotes_directory("http://example.com/docs/"));
        assert!(denotes_directory("http://example.com/docs/index.html"));
        assert!(!denotes_directory("http://example.com/docs"));
        assert!(!denotes_directory("http://example.com/docs/page.html"));
    }

    #[test]
    fn test_index_url() {
        assert_eq!(
            index_url("http://example.com/docs/"),
            "http://example.com/docs/index.html"
        );
        assert_eq!(
            index_url("http://example.com"),
            "http://example.com/index.html"
        );
        assert_eq!(
            index_url("http://example.com/docs/index.html"),
            "http://example.com/docs/index.html"
        );
        assert_eq!(
            index_url("http://example.com/docs/?page=2"),
            "http://example.com/docs/index.html"
        );
    }
}
