//! Integration tests for the search client

use serde_json::json;
use tokio_util::sync::CancellationToken;
use web_distill::config::Config;
use web_distill::fetch::RequestShaper;
use web_distill::{SearchClient, SearchError, SearchRequest};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/api/paas/v4/web_search";

fn create_client(server: &MockServer, token: &str) -> SearchClient {
    let mut config = Config::default();
    config.fetch.user_agent_rotate = false;
    config.search.api_token = token.to_string();
    config.search.base_url = format!("{}{}", server.uri(), SEARCH_PATH);
    SearchClient::with_shaper(&config, RequestShaper::with_seed(9)).expect("client")
}

#[tokio::test]
async fn test_search_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "search_query": "rust web scraping",
            "search_engine": "search_pro",
            "search_intent": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "search-1",
            "created": 1_718_000_000,
            "request_id": "req-abc",
            "search_intent": [
                { "query": "rust web scraping", "intent": "SEARCH_ALL", "keywords": "rust scraping" }
            ],
            "search_result": [
                {
                    "title": "scraper crate",
                    "content": "HTML parsing and querying with CSS selectors.",
                    "link": "https://docs.rs/scraper",
                    "refer": "ref_1"
                }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server, "test-token");
    let request = SearchRequest {
        search_engine: Some("search_pro".to_string()),
        search_intent: true,
        ..SearchRequest::new("rust web scraping")
    };

    let response = client
        .search(&request, &CancellationToken::new())
        .await
        .expect("search");

    assert_eq!(response.request_id, "req-abc");
    assert_eq!(response.search_intent.len(), 1);
    assert_eq!(response.search_result.len(), 1);
    assert_eq!(response.search_result[0].link, "https://docs.rs/scraper");
    assert_eq!(response.search_result[0].publish_date, "");
}

#[tokio::test]
async fn test_unknown_engine_uses_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!({
            "search_query": "q",
            "search_engine": "search_std",
            "search_intent": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "request_id": "r" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server, "t");
    let request = SearchRequest {
        search_engine: Some("not-an-engine".to_string()),
        ..SearchRequest::new("q")
    };

    let response = client
        .search(&request, &CancellationToken::new())
        .await
        .expect("search");
    assert!(response.search_result.is_empty());
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server, "");
    let result = client
        .search(&SearchRequest::new("q"), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(SearchError::MissingToken)));
}

#[tokio::test]
async fn test_rate_limited_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server, "t");
    let result = client
        .search(&SearchRequest::new("q"), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(SearchError::RateLimited { status: 429 })));
}

#[tokio::test]
async fn test_blocked() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(451))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server, "t");
    let result = client
        .search(&SearchRequest::new("q"), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(SearchError::Blocked { status: 451 })));
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server, "bad");
    let result = client
        .search(&SearchRequest::new("q"), &CancellationToken::new())
        .await;

    match result {
        Err(SearchError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_undecodable_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server, "t");
    let result = client
        .search(&SearchRequest::new("q"), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(SearchError::Decode(_))));
}
