//! Integration tests for the page fetcher
//!
//! These tests use wiremock to serve pages and exercise the full
//! fetch cycle over real HTTP.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use web_distill::config::Config;
use web_distill::fetch::{RequestShaper, WebFetcher, MAX_ATTEMPTS};
use web_distill::{FetchError, FetchErrorKind, FetchRequest};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration without the randomized pre-request delay
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.fetch.user_agent_rotate = false;
    config.fetch.timeout_ms = 5_000;
    config
}

fn create_fetcher() -> WebFetcher {
    let config = create_test_config();
    let transport = web_distill::fetch::ReqwestTransport::new().expect("client");
    WebFetcher::with_transport(transport, &config, RequestShaper::with_seed(42))
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("write");
    encoder.finish().expect("finish")
}

const ARTICLE_PAGE: &str = r##"<html lang="en">
<head>
    <title>Integration Page</title>
    <meta name="description" content="A page served by wiremock">
</head>
<body>
    <nav><a href="/">Home</a></nav>
    <article>
        This article body is long enough to be picked up by the semantic
        container tier of the content ladder without any fallback.
    </article>
    <a href="/next">Next</a>
    <a href="#">Top</a>
    <img src="/static/logo.png">
</body>
</html>"##;

#[tokio::test]
async fn test_full_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(ARTICLE_PAGE, "text/html")
                .insert_header("x-served-by", "wiremock"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/article", mock_server.uri());
    let request = FetchRequest {
        include_links: true,
        include_images: true,
        ..FetchRequest::new(url.clone())
    };

    let page = create_fetcher().fetch(&request).await.expect("fetch");

    assert_eq!(page.url, url);
    assert_eq!(page.status_code, 200);
    assert!(page.content_type.starts_with("text/html"));
    assert_eq!(page.title, "Integration Page");
    assert_eq!(page.description, "A page served by wiremock");
    assert_eq!(page.language, "en");
    assert!(page
        .content
        .starts_with("This article body is long enough to be picked up"));
    assert_eq!(
        page.links,
        vec![
            format!("{}/", mock_server.uri()),
            format!("{}/next", mock_server.uri()),
        ]
    );
    assert_eq!(
        page.images,
        vec![format!("{}/static/logo.png", mock_server.uri())]
    );
    assert_eq!(
        page.headers.get("x-served-by").map(String::as_str),
        Some("wiremock")
    );
}

#[tokio::test]
async fn test_shaped_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("dnt", "1"))
        .and(header("upgrade-insecure-requests", "1"))
        .and(header("sec-fetch-mode", "navigate"))
        .and(header("sec-fetch-dest", "document"))
        .and(header("sec-fetch-user", "?1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>ok</p>", "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    create_fetcher()
        .fetch(&FetchRequest::new(mock_server.uri()))
        .await
        .expect("fetch");
}

#[tokio::test]
async fn test_user_agent_override() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "IntegrationAgent/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>ok</p>", "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = FetchRequest {
        user_agent: Some("IntegrationAgent/2.0".to_string()),
        ..FetchRequest::new(mock_server.uri())
    };
    create_fetcher().fetch(&request).await.expect("fetch");
}

#[tokio::test]
async fn test_rate_limited_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<title>Third time lucky</title>", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = create_fetcher()
        .fetch(&FetchRequest::new(mock_server.uri()))
        .await
        .expect("fetch");

    assert_eq!(page.title, "Third time lucky");
}

#[tokio::test]
async fn test_rate_limit_exhausts_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "0"))
        .expect(u64::from(MAX_ATTEMPTS))
        .mount(&mock_server)
        .await;

    let err = create_fetcher()
        .fetch(&FetchRequest::new(mock_server.uri()))
        .await
        .unwrap_err();

    match err {
        FetchError::RateLimited { attempts, status } => {
            assert_eq!(attempts, 3);
            assert_eq!(status, Some(503));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_cloudflare_block_is_immediate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("server", "cloudflare")
                .insert_header("cf-ray", "8a1b2c3d4e5f-AMS")
                .set_body_string("Attention Required!"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = create_fetcher()
        .fetch(&FetchRequest::new(mock_server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FetchErrorKind::Blocked);
    assert_eq!(err.status_code(), Some(403));
    match err {
        FetchError::Blocked { waf, .. } => assert_eq!(waf.as_deref(), Some("cloudflare")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_nginx_403_is_blocked_without_waf() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).insert_header("server", "nginx"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = create_fetcher()
        .fetch(&FetchRequest::new(mock_server.uri()))
        .await
        .unwrap_err();

    match err {
        FetchError::Blocked { status, waf } => {
            assert_eq!(status, 403);
            assert_eq!(waf, None);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found_is_returned_as_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404).set_body_raw("<title>Not Found</title>", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = create_fetcher()
        .fetch(&FetchRequest::new(mock_server.uri()))
        .await
        .expect("fetch");

    assert_eq!(page.status_code, 404);
    assert_eq!(page.title, "Not Found");
}

#[tokio::test]
async fn test_undeclared_gzip_is_sniffed() {
    let mock_server = MockServer::start().await;

    let body = gzip(b"<html><head><title>Sneaky gzip</title></head><body></body></html>");
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let page = create_fetcher()
        .fetch(&FetchRequest::new(mock_server.uri()))
        .await
        .expect("fetch");

    assert_eq!(page.title, "Sneaky gzip");
}

#[tokio::test]
async fn test_declared_gzip_is_decoded() {
    let mock_server = MockServer::start().await;

    let body = gzip(b"<html><head><title>Honest gzip</title></head><body></body></html>");
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("content-type", "text/html")
                .insert_header("content-encoding", "gzip"),
        )
        .mount(&mock_server)
        .await;

    let page = create_fetcher()
        .fetch(&FetchRequest::new(mock_server.uri()))
        .await
        .expect("fetch");

    assert_eq!(page.title, "Honest gzip");
}

#[tokio::test]
async fn test_corrupt_declared_gzip_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"definitely not gzip".to_vec())
                .insert_header("content-type", "text/html")
                .insert_header("content-encoding", "gzip"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = create_fetcher()
        .fetch(&FetchRequest::new(mock_server.uri()))
        .await
        .expect_err("corrupt gzip must fail");

    assert_eq!(err.kind(), FetchErrorKind::Decompression);
    assert!(matches!(err, FetchError::Decompression(_)));
}

#[tokio::test]
async fn test_multi_member_gzip_is_fully_decoded() {
    let mock_server = MockServer::start().await;

    let mut body = gzip(b"<html><head><title>Streamed</title></head><body><p>first member</p>");
    body.extend(gzip(b"<p>second member</p></body></html>"));
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("content-type", "text/html")
                .insert_header("content-encoding", "gzip"),
        )
        .mount(&mock_server)
        .await;

    let page = create_fetcher()
        .fetch(&FetchRequest::new(mock_server.uri()))
        .await
        .expect("fetch");

    assert_eq!(page.title, "Streamed");
    assert!(page.content.contains("first member"));
    assert!(page.content.contains("second member"));
}

#[tokio::test]
async fn test_unreachable_host_reports_transport_failure() {
    // Bind then drop a listener so the port is known to be closed
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };

    let err = create_fetcher()
        .fetch(&FetchRequest::new(format!("http://127.0.0.1:{}/", port)))
        .await
        .unwrap_err();

    match err {
        FetchError::Transport { attempts, .. } => assert_eq!(attempts, MAX_ATTEMPTS),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_scheme_rejected_without_request() {
    let mock_server = MockServer::start().await;

    let ftp_url = mock_server.uri().replacen("http", "ftp", 1);
    let err = create_fetcher()
        .fetch(&FetchRequest::new(ftp_url))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FetchErrorKind::UnsupportedScheme);
    let requests = mock_server.received_requests().await.expect("recording");
    assert!(requests.is_empty());
}
