//! Integration tests for whole mirror runs
//!
//! These tests use wiremock to create mock HTTP servers and check the files
//! a run leaves in a temporary output directory.

use site_mirror::config::MirrorConfig;
use site_mirror::{mirror, mirror_blocking, CancelToken, Mirror, MirrorError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing_test::traced_test;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing below `dir`
fn create_test_config(dir: &Path, reject: &str, exclude: &str, convert_links: bool) -> MirrorConfig {
    let mut config = MirrorConfig::new(reject, exclude, convert_links);
    config.crawl.output_dir = dir.to_path_buf();
    config.crawl.max_concurrency = 4;
    config.http.request_timeout_secs = 5;
    config
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8")
}

fn bytes(body: &'static [u8], mime: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, mime)
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_asset(server: &MockServer, route: &str, body: &'static [u8], mime: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(bytes(body, mime))
        .expect(hits)
        .mount(server)
        .await;
}

fn site_dir(out: &TempDir) -> PathBuf {
    out.path().join("127.0.0.1")
}

#[tokio::test]
async fn test_full_mirror_single_domain() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            r#"<html><head>
                <link rel="stylesheet" href="/css/site.css">
                <style>body {{ background: url('/img/bg.png'); }}</style>
            </head><body>
                <a href="/about">About</a>
                <img src="{}/img/logo.png">
            </body></html>"#,
            base
        ),
    )
    .await;
    mount_page(
        &server,
        "/about",
        r#"<html><body><img src="/img/logo.png"><a href="/">Home</a></body></html>"#.to_string(),
    )
    .await;
    mount_asset(&server, "/css/site.css", b"body { }", "text/css", 1).await;
    mount_asset(&server, "/img/bg.png", b"PNGBG", "image/png", 1).await;
    // Shared by both pages: one GET, one file
    mount_asset(&server, "/img/logo.png", b"PNGLOGO", "image/png", 1).await;

    let out = TempDir::new().unwrap();
    let summary = mirror(
        &format!("{}/", base),
        create_test_config(out.path(), "", "", false),
    )
    .await
    .unwrap();

    let site = site_dir(&out);
    assert!(site.join("index.html").is_file());
    assert!(site.join("about.html").is_file());
    assert_eq!(fs::read(site.join("css/site.css")).unwrap(), b"body { }");
    assert_eq!(fs::read(site.join("img/bg.png")).unwrap(), b"PNGBG");
    assert_eq!(fs::read(site.join("img/logo.png")).unwrap(), b"PNGLOGO");

    assert_eq!(summary.root_domain, "127.0.0.1");
    assert!(summary.pages_visited >= 2);
    assert!(summary.assets_saved >= 5);
    assert!(!summary.cancelled);
}

#[tokio::test]
async fn test_root_forced_to_index() {
    let server = MockServer::start().await;
    let root_body = r#"<html><body><p>home</p><img src="/pic.gif"></body></html>"#;
    mount_page(&server, "/", root_body.to_string()).await;
    mount_asset(&server, "/pic.gif", b"GIF89a", "image/gif", 1).await;

    let out = TempDir::new().unwrap();
    // No trailing slash on the seed
    mirror(&server.uri(), create_test_config(out.path(), "", "", false))
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(site_dir(&out).join("index.html")).unwrap(),
        root_body
    );

    // The root is saved before any of its links are dispatched
    let requests = server.received_requests().await.unwrap();
    let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    let first_root = paths.iter().position(|p| *p == "/").unwrap();
    let image = paths.iter().position(|p| *p == "/pic.gif").unwrap();
    assert!(first_root < image, "request order: {:?}", paths);
    assert!(
        paths[..image].iter().filter(|p| **p == "/").count() >= 2,
        "request order: {:?}",
        paths
    );
}

#[tokio::test]
async fn test_cross_domain_links_are_leaves() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;
    let other_port = other.address().port();
    // Same machine, different host name
    let foreign = format!("http://localhost:{}", other_port);

    mount_page(
        &site,
        "/",
        format!(
            r#"<a href="{0}/page">elsewhere</a><img src="{0}/pic.gif">"#,
            foreign
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html(r#"<a href="/deeper">deeper</a>"#))
        .expect(1)
        .mount(&other)
        .await;
    mount_asset(&other, "/pic.gif", b"GIF89a", "image/gif", 1).await;
    mount_asset(&other, "/deeper", b"never", "text/html", 0).await;

    let out = TempDir::new().unwrap();
    mirror(
        &format!("{}/", site.uri()),
        create_test_config(out.path(), "", "", false),
    )
    .await
    .unwrap();

    let foreign_dir = out.path().join("localhost");
    assert!(foreign_dir.join("page.html").is_file());
    assert_eq!(fs::read(foreign_dir.join("pic.gif")).unwrap(), b"GIF89a");
    assert!(!foreign_dir.join("deeper.html").exists());
}

#[tokio::test]
#[traced_test]
async fn test_rejected_extensions_produce_no_files() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<img src="/a.png"><img src="/b.JPG"><img src="/c.gif">"#.to_string(),
    )
    .await;
    mount_asset(&server, "/a.png", b"png", "image/png", 0).await;
    mount_asset(&server, "/b.JPG", b"jpg", "image/jpeg", 0).await;
    mount_asset(&server, "/c.gif", b"gif", "image/gif", 1).await;

    let out = TempDir::new().unwrap();
    mirror(
        &format!("{}/", server.uri()),
        create_test_config(out.path(), "png,jpg", "", false),
    )
    .await
    .unwrap();

    let site = site_dir(&out);
    assert!(!site.join("a.png").exists());
    assert!(!site.join("b.JPG").exists());
    assert!(site.join("c.gif").is_file());
    assert!(logs_contain("Skipping rejected file"));
}

#[tokio::test]
async fn test_rejected_paths_are_never_requested() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/private/secret">s</a><img src="/private/x.gif"><a href="/public">p</a>"#
            .to_string(),
    )
    .await;
    mount_page(&server, "/public", "<p>public</p>".to_string()).await;
    mount_asset(&server, "/private/secret", b"no", "text/html", 0).await;
    mount_asset(&server, "/private/x.gif", b"no", "image/gif", 0).await;

    let out = TempDir::new().unwrap();
    mirror(
        &format!("{}/", server.uri()),
        create_test_config(out.path(), "", "/private", false),
    )
    .await
    .unwrap();

    assert!(!site_dir(&out).join("private").exists());
    assert!(site_dir(&out).join("public.html").is_file());
}

#[tokio::test]
async fn test_failed_branch_does_not_stop_siblings() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/missing">gone</a><a href="/ok">ok</a>"#.to_string(),
    )
    .await;
    mount_page(&server, "/ok", r#"<img src="/ok.png">"#.to_string()).await;
    mount_asset(&server, "/ok.png", b"OK", "image/png", 1).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let summary = mirror(
        &format!("{}/", server.uri()),
        create_test_config(out.path(), "", "", false),
    )
    .await
    .unwrap();

    assert!(!site_dir(&out).join("missing").exists());
    assert_eq!(fs::read(site_dir(&out).join("ok.png")).unwrap(), b"OK");
    assert!(summary.assets_not_saved() >= 1);
}

#[tokio::test]
async fn test_convert_links_rewrites_saved_pages() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            r#"<a href="{}/about">About</a><img src="/img/logo.png"><a href="relative.html">r</a>"#,
            base
        ),
    )
    .await;
    mount_page(
        &server,
        "/about",
        r#"<a href="/">Home</a><img src="/img/logo.png">"#.to_string(),
    )
    .await;
    mount_asset(&server, "/img/logo.png", b"PNG", "image/png", 1).await;

    let out = TempDir::new().unwrap();
    mirror(
        &format!("{}/", base),
        create_test_config(out.path(), "", "", true),
    )
    .await
    .unwrap();

    let index = fs::read_to_string(site_dir(&out).join("index.html")).unwrap();
    assert!(index.contains(r#"href="about.html""#), "{}", index);
    assert!(index.contains(r#"src="img/logo.png""#), "{}", index);
    assert!(index.contains(r#"href="relative.html""#), "{}", index);
    assert!(!index.contains("href=\"http"), "{}", index);

    let about = fs::read_to_string(site_dir(&out).join("about.html")).unwrap();
    assert!(about.contains(r#"href="index.html""#), "{}", about);
}

#[tokio::test]
async fn test_existing_files_are_not_overwritten() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<link href="/site.css">"#.to_string()).await;
    mount_asset(&server, "/site.css", b"fresh", "text/css", 1).await;

    let out = TempDir::new().unwrap();
    let site = site_dir(&out);
    fs::create_dir_all(&site).unwrap();
    fs::write(site.join("index.html"), "sentinel").unwrap();
    fs::write(site.join("site.css"), "stale").unwrap();

    mirror(
        &format!("{}/", server.uri()),
        create_test_config(out.path(), "", "", false),
    )
    .await
    .unwrap();

    assert_eq!(fs::read_to_string(site.join("index.html")).unwrap(), "sentinel");
    assert_eq!(fs::read_to_string(site.join("site.css")).unwrap(), "stale");
}

#[tokio::test]
async fn test_pages_visited_once_despite_cycles() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/a",
        r#"<a href="/b">b</a><a href="/a">self</a>"#.to_string(),
    )
    .await;
    mount_page(&server, "/b", r#"<a href="/a">a</a>"#.to_string()).await;

    let out = TempDir::new().unwrap();
    let summary = mirror(
        &format!("{}/a", server.uri()),
        create_test_config(out.path(), "", "", false),
    )
    .await
    .unwrap();

    assert_eq!(summary.pages_visited, 2);
}

#[tokio::test]
async fn test_seed_without_host_is_fatal() {
    let out = TempDir::new().unwrap();
    let result = mirror("not a url", create_test_config(out.path(), "", "", false)).await;
    assert!(matches!(result, Err(MirrorError::DomainExtraction { .. })));
}

#[tokio::test]
async fn test_cancelled_run_requests_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<p>x</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();

    let mirror = Mirror::new(
        &format!("{}/", server.uri()),
        create_test_config(out.path(), "", "", false),
    )
    .unwrap()
    .with_cancel_token(cancel);
    let summary = Arc::new(mirror).run().await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.assets_saved, 0);
}

#[test]
fn test_mirror_blocking_drives_its_own_runtime() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        mount_page(&server, "/", r#"<img src="/x.gif">"#.to_string()).await;
        mount_asset(&server, "/x.gif", b"GIF", "image/gif", 1).await;
        server
    });

    let out = TempDir::new().unwrap();
    let summary = mirror_blocking(
        &format!("{}/", server.uri()),
        create_test_config(out.path(), "", "", false),
    )
    .unwrap();

    assert_eq!(fs::read(site_dir(&out).join("x.gif")).unwrap(), b"GIF");
    assert_eq!(summary.assets_saved, 2);
    drop(server);
}
