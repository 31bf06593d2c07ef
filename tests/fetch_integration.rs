//! Integration tests for the fetch workflow.
//!
//! These tests drive the fetcher against mock HTTP servers.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use tempfile::TempDir;
use vk_doc_downloader::{
    run_batch, BatchStats, Config, DownloadTarget, Fetcher, FileInfo, PermitPool,
};
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config whose viewer pattern matches the mock server's `/doc...` paths.
fn test_config() -> Config {
    let mut config = Config::default();
    config.viewer.url_pattern = "/doc".to_string();
    config
}

fn test_fetcher() -> Fetcher {
    Fetcher::from_config(&test_config()).expect("fetcher should build")
}

async fn mount_body(server: &MockServer, route: &str, body: &[u8], mime: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_vec(), mime))
        .mount(server)
        .await;
}

fn files_under(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current).expect("readable dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files
}

#[tokio::test]
async fn test_image_saved_under_type_folder() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    mount_body(&server, "/photo.jpg", b"\xff\xd8\xff\xe0jpeg-bytes", "image/jpeg").await;

    let url = format!("{}/photo.jpg", server.uri());
    let target = DownloadTarget::new(&url, temp.path(), "photo");
    let pool = PermitPool::new(2);

    let result = test_fetcher().fetch(&target, &pool).await;

    assert_eq!(result.file_info, FileInfo::Media("image/jpeg".to_string()));
    assert_eq!(result.url, url);

    let expected = temp.path().join("image").join("jpeg").join("photo.jpeg");
    assert_eq!(result.path.as_deref(), Some(expected.as_path()));
    assert_eq!(
        std::fs::read(&expected).expect("file written"),
        b"\xff\xd8\xff\xe0jpeg-bytes"
    );
    assert_eq!(pool.available(), 2);
}

#[tokio::test]
async fn test_image_content_type_wins_on_viewer_host() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    mount_body(&server, "/doc55_66", b"GIF89a", "image/gif").await;

    let target = DownloadTarget::new(format!("{}/doc55_66", server.uri()), temp.path(), "anim");
    let result = test_fetcher().fetch(&target, &PermitPool::new(1)).await;

    assert_eq!(result.file_info.as_str(), "image/gif");
    assert!(temp.path().join("image/gif/anim.gif").exists());
}

#[tokio::test]
async fn test_viewer_iframe_resolved_to_audio() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");

    let asset_url = format!("{}/cdn/track.mp3?extra=abc", server.uri());
    let page = format!(
        r#"<html><head><title>Документ</title></head>
        <body><iframe src="{}"></iframe></body></html>"#,
        asset_url
    );
    mount_body(&server, "/doc123", page.as_bytes(), "text/html; charset=utf-8").await;
    mount_body(&server, "/cdn/track.mp3", b"ID3-audio-bytes", "audio/mpeg").await;

    let mut cookies = BTreeMap::new();
    cookies.insert("remixsid".to_string(), "secret".to_string());
    let target = DownloadTarget::new(format!("{}/doc123", server.uri()), temp.path(), "doc123")
        .with_cookies(cookies);

    let result = test_fetcher().fetch(&target, &PermitPool::new(1)).await;

    assert_eq!(result.file_info, FileInfo::Media("audio/mpeg".to_string()));
    assert_eq!(result.url, asset_url);
    let saved = temp.path().join("audio").join("mpeg").join("track.mp3");
    assert_eq!(std::fs::read(&saved).expect("file written"), b"ID3-audio-bytes");

    let requests = server.received_requests().await.expect("recording enabled");
    let doc_requests: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/doc123")
        .collect();
    assert_eq!(doc_requests.len(), 2);
    assert!(doc_requests
        .iter()
        .any(|r| r.headers.get("cookie").map(|v| v.as_bytes()) == Some(b"remixsid=secret".as_slice())));
}

#[tokio::test]
async fn test_viewer_link_keeps_non_ascii_file_name() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");

    let page = format!(
        r#"<html><body><iframe src="{}/cdn/отчёт 2024.mp3?extra=1"></iframe></body></html>"#,
        server.uri()
    );
    mount_body(&server, "/doc42_1", page.as_bytes(), "text/html; charset=utf-8").await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/cdn/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"ID3".to_vec(), "audio/mpeg"))
        .mount(&server)
        .await;

    let target = DownloadTarget::new(format!("{}/doc42_1", server.uri()), temp.path(), "doc42_1");
    let result = test_fetcher().fetch(&target, &PermitPool::new(1)).await;

    assert_eq!(result.file_info.as_str(), "audio/mpeg");
    let names: Vec<String> = std::fs::read_dir(temp.path().join("audio/mpeg"))
        .expect("type folder created")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["отчёт 2024.mp3".to_string()]);
}

#[tokio::test]
async fn test_viewer_relative_image_src() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");

    mount_body(
        &server,
        "/doc7_8",
        br#"<html><body><img src="/cdn/pic.gif"><iframe src="/other"></iframe></body></html>"#,
        "text/html",
    )
    .await;
    mount_body(&server, "/cdn/pic.gif", b"GIF89a-data", "image/gif").await;

    let target = DownloadTarget::new(format!("{}/doc7_8", server.uri()), temp.path(), "doc7_8");
    let result = test_fetcher().fetch(&target, &PermitPool::new(1)).await;

    assert_eq!(result.file_info.as_str(), "image/gif");
    assert!(temp.path().join("image/gif/pic.gif").exists());
}

#[tokio::test]
async fn test_viewer_redirect_used_without_embedded_element() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");

    // First visit serves the bare viewer page, the second redirects to the file.
    Mock::given(method("GET"))
        .and(path("/doc777"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body><p>loading</p></body></html>", "text/html"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/doc777"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/files/report.pdf"))
        .mount(&server)
        .await;
    mount_body(&server, "/files/report.pdf", b"%PDF-1.7", "application/pdf").await;

    let target = DownloadTarget::new(format!("{}/doc777", server.uri()), temp.path(), "doc777");
    let result = test_fetcher().fetch(&target, &PermitPool::new(1)).await;

    assert_eq!(result.file_info.as_str(), "application/pdf");
    assert_eq!(result.url, format!("{}/files/report.pdf", server.uri()));
    let saved = temp.path().join("application/pdf/report.pdf");
    assert_eq!(std::fs::read(saved).expect("file written"), b"%PDF-1.7");
}

#[tokio::test]
async fn test_access_denied_page_is_error() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");

    mount_body(
        &server,
        "/doc9_9",
        "<html><head><title>Ошибка | ВКонтакте</title></head><body><img src=\"/x.png\"></body></html>"
            .as_bytes(),
        "text/html; charset=utf-8",
    )
    .await;

    let url = format!("{}/doc9_9", server.uri());
    let target = DownloadTarget::new(&url, temp.path(), "doc9_9");
    let result = test_fetcher().fetch(&target, &PermitPool::new(1)).await;

    assert_eq!(result.file_info, FileInfo::Error);
    assert_eq!(result.url, url);
    assert!(files_under(temp.path()).is_empty());
}

#[tokio::test]
async fn test_unresolvable_viewer_is_error() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    mount_body(&server, "/doc404", b"<html><body>empty</body></html>", "text/html").await;

    let url = format!("{}/doc404", server.uri());
    let result = test_fetcher()
        .fetch(&DownloadTarget::new(&url, temp.path(), "doc404"), &PermitPool::new(1))
        .await;

    assert_eq!(result.file_info, FileInfo::Error);
    assert_eq!(result.url, url);
}

#[tokio::test]
async fn test_pdf_on_other_host_not_parsed() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    mount_body(&server, "/files/a.pdf", b"%PDF", "application/pdf").await;

    let url = format!("{}/files/a.pdf", server.uri());
    let result = test_fetcher()
        .fetch(&DownloadTarget::new(&url, temp.path(), "a"), &PermitPool::new(1))
        .await;

    assert_eq!(result.file_info, FileInfo::NotParsed);
    assert_eq!(result.url, url);
    assert!(result.path.is_none());
    assert!(files_under(temp.path()).is_empty());
}

#[tokio::test]
async fn test_html_outside_viewer_not_parsed() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    mount_body(&server, "/wall1_2", b"<img src=\"/x.png\">", "text/html").await;

    let url = format!("{}/wall1_2", server.uri());
    let result = test_fetcher()
        .fetch(&DownloadTarget::new(&url, temp.path(), "wall"), &PermitPool::new(1))
        .await;

    assert_eq!(result.file_info, FileInfo::NotParsed);
    assert!(files_under(temp.path()).is_empty());
}

#[tokio::test]
async fn test_non_200_is_error_with_input_url() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/gone.jpg", server.uri());
    let pool = PermitPool::new(1);
    let result = test_fetcher()
        .fetch(&DownloadTarget::new(&url, temp.path(), "gone"), &pool)
        .await;

    assert_eq!(result.file_info, FileInfo::Error);
    assert_eq!(result.url, url);
    assert_eq!(pool.available(), 1);
}

#[tokio::test]
async fn test_failed_asset_request_is_error() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");

    let page = format!(r#"<iframe src="{}/cdn/missing"></iframe>"#, server.uri());
    mount_body(&server, "/doc1_1", page.as_bytes(), "text/html").await;
    Mock::given(method("GET"))
        .and(path("/cdn/missing"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let url = format!("{}/doc1_1", server.uri());
    let result = test_fetcher()
        .fetch(&DownloadTarget::new(&url, temp.path(), "doc1_1"), &PermitPool::new(1))
        .await;

    assert_eq!(result.file_info, FileInfo::Error);
    assert_eq!(result.url, url);
}

#[tokio::test]
async fn test_malformed_content_type_is_error() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    Mock::given(method("GET"))
        .and(path("/weird"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image")
                .set_body_bytes(b"data".to_vec()),
        )
        .mount(&server)
        .await;

    let url = format!("{}/weird", server.uri());
    let result = test_fetcher()
        .fetch(&DownloadTarget::new(&url, temp.path(), "weird"), &PermitPool::new(1))
        .await;

    assert_eq!(result.file_info, FileInfo::Error);
}

#[tokio::test]
async fn test_invalid_url_is_error() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let result = test_fetcher()
        .fetch(
            &DownloadTarget::new("not a url", temp.path(), "x"),
            &PermitPool::new(1),
        )
        .await;

    assert_eq!(result.file_info, FileInfo::Error);
    assert_eq!(result.url, "not a url");
}

#[tokio::test]
async fn test_accept_language_header_sent() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/voice.ogg"))
        .and(header("accept-language", "ru"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"OggS".to_vec(), "audio/ogg"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/voice.ogg", server.uri());
    let result = test_fetcher()
        .fetch(&DownloadTarget::new(&url, temp.path(), "voice"), &PermitPool::new(1))
        .await;

    assert_eq!(result.file_info.as_str(), "audio/ogg");
    assert!(temp.path().join("audio/ogg/voice.ogg").exists());
}

#[tokio::test]
async fn test_single_permit_serializes_sessions() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let delay = Duration::from_millis(200);

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"png".to_vec(), "image/png")
                .set_delay(delay),
        )
        .mount(&server)
        .await;

    let targets: Vec<_> = (0..3)
        .map(|i| {
            DownloadTarget::new(
                format!("{}/img{}.png", server.uri(), i),
                temp.path(),
                format!("img{}", i),
            )
        })
        .collect();

    let pool = PermitPool::new(1);
    let started = Instant::now();
    let results = run_batch(&test_fetcher(), &targets, &pool, &ProgressBar::hidden()).await;

    assert!(started.elapsed() >= delay * 3);
    assert!(results.iter().all(|r| r.is_saved()));
    assert_eq!(pool.available(), 1);
}

#[tokio::test]
async fn test_two_permits_bound_overlapping_sessions() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let delay = Duration::from_millis(300);

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"mp3".to_vec(), "audio/mpeg")
                .set_delay(delay),
        )
        .mount(&server)
        .await;

    let targets: Vec<_> = (0..4)
        .map(|i| {
            DownloadTarget::new(
                format!("{}/track{}.mp3", server.uri(), i),
                temp.path(),
                format!("track{}", i),
            )
        })
        .collect();

    let pool = PermitPool::new(2);
    let started = Instant::now();
    let results = run_batch(&test_fetcher(), &targets, &pool, &ProgressBar::hidden()).await;
    let elapsed = started.elapsed();

    // Two waves of two: never more than two sessions, never fully serialized.
    assert!(elapsed >= delay * 2, "finished too fast: {:?}", elapsed);
    assert!(elapsed < delay * 4, "sessions did not overlap: {:?}", elapsed);
    assert!(results.iter().all(|r| r.is_saved()));
    assert_eq!(files_under(temp.path()).len(), 4);
    assert_eq!(pool.available(), 2);
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");

    mount_body(&server, "/ok.jpg", b"jpeg", "image/jpeg").await;
    mount_body(&server, "/doc.pdf", b"%PDF", "application/pdf").await;
    Mock::given(method("GET"))
        .and(path("/broken.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let targets = vec![
        DownloadTarget::new(format!("{}/broken.jpg", server.uri()), temp.path(), "broken"),
        DownloadTarget::new(format!("{}/ok.jpg", server.uri()), temp.path(), "ok"),
        DownloadTarget::new(format!("{}/doc.pdf", server.uri()), temp.path(), "doc"),
    ];

    let pool = PermitPool::new(2);
    let results = run_batch(&test_fetcher(), &targets, &pool, &ProgressBar::hidden()).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].file_info, FileInfo::Error);
    assert_eq!(results[1].file_info.as_str(), "image/jpeg");
    assert_eq!(results[2].file_info, FileInfo::NotParsed);

    let stats = BatchStats::from_results(&results);
    assert_eq!(stats.saved_count, 1);
    assert_eq!(stats.not_parsed_count, 1);
    assert_eq!(stats.error_count, 1);
    assert_eq!(files_under(temp.path()).len(), 1);
}
