//! Integration tests for the webhook router.
//!
//! Requests go straight through the router with `oneshot`; the peer address
//! normally supplied by the listener comes from `MockConnectInfo`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Method, Request, StatusCode};
use page_scraper::{
    AppState, FetchError, PageFetcher, RateLimiter, ResultCache, RetryingScraper, ScrapeService,
    create_app,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const KEY: &str = "integration-key";

struct StubFetcher {
    calls: AtomicU32,
    fail: bool,
}

#[async_trait]
impl PageFetcher for StubFetcher {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FetchError::http_status(url, 502));
        }
        Ok(r#"<html><head><title>Stubbed</title>
            <meta name="description" content="stub page"></head>
            <body><h1>Hello</h1><a href="/a">A</a><a href="/b">B</a></body></html>"#
            .to_string())
    }
}

struct Harness {
    app: Router,
    fetcher: Arc<StubFetcher>,
}

fn harness_with(fail: bool, rate_limit: usize, assets_dir: &std::path::Path) -> Harness {
    let fetcher = Arc::new(StubFetcher {
        calls: AtomicU32::new(0),
        fail,
    });
    let service = ScrapeService::new(
        Arc::new(RateLimiter::new(rate_limit, Duration::from_secs(60))),
        Arc::new(ResultCache::new(Duration::from_secs(3600))),
        RetryingScraper::new(fetcher.clone()),
    );
    let app = create_app(AppState::new(service, KEY), assets_dir)
        .layer(MockConnectInfo(SocketAddr::from(([10, 1, 2, 3], 40000))));
    Harness { app, fetcher }
}

fn harness(fail: bool) -> Harness {
    harness_with(fail, 10, std::path::Path::new("assets"))
}

fn webhook_post(key: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("X-Webhook-Key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_home_returns_welcome_text() {
    let h = harness(false);
    let (status, body) = send(&h.app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "Welcome to the page scraper service!"
    );
}

#[tokio::test]
async fn test_test_route_reports_working() {
    let h = harness(false);
    let (status, body) = send_json(&h.app, get("/test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Test route is working!" }));
}

#[tokio::test]
async fn test_webhook_get_describes_endpoint() {
    let h = harness(false);
    let (status, body) = send_json(&h.app, get("/webhook")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Webhook endpoint is active. Please use POST method to submit data."
    );
}

#[tokio::test]
async fn test_webhook_success_returns_scraped_data() {
    let h = harness(false);
    let (status, body) = send_json(
        &h.app,
        webhook_post(Some(KEY), r#"{"website_url":"https://stub.example/page"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Website successfully scraped.");
    let data = &body["scraped_data"];
    assert_eq!(data["url"], "https://stub.example/page");
    assert_eq!(data["title"], "Stubbed");
    assert_eq!(data["meta_description"], "stub page");
    assert_eq!(data["h1_tags"], json!(["Hello"]));
    assert_eq!(data["links"][0], json!({ "text": "A", "href": "/a" }));
    assert_eq!(data["pages_count"], 3);
    assert!(data["main_content"].is_string());
}

#[tokio::test]
async fn test_webhook_second_request_is_cached() {
    let h = harness(false);
    let body = r#"{"website_url":"https://stub.example/cached"}"#;

    let (first_status, first) = send_json(&h.app, webhook_post(Some(KEY), body)).await;
    let (second_status, second) = send_json(&h.app, webhook_post(Some(KEY), body)).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_webhook_missing_key_is_unauthorized() {
    let h = harness(false);
    let (status, body) = send_json(
        &h.app,
        webhook_post(None, r#"{"website_url":"https://stub.example"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid webhook key" }));
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_webhook_wrong_key_is_unauthorized() {
    let h = harness(false);
    let (status, _) = send_json(
        &h.app,
        webhook_post(Some("nope"), r#"{"website_url":"https://stub.example"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_validation_errors() {
    let h = harness(false);
    let cases = [
        ("", "No data provided."),
        ("not json", "No data provided."),
        ("{}", "No data provided."),
        (
            r#"{"other":"x"}"#,
            "Missing 'website_url' in the request data.",
        ),
        (
            r#"{"website_url":""}"#,
            "'website_url' must be a non-empty string.",
        ),
        (
            r#"{"website_url":42}"#,
            "'website_url' must be a non-empty string.",
        ),
    ];

    for (body, message) in cases {
        let (status, json) = send_json(&h.app, webhook_post(Some(KEY), body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json, json!({ "error": message }), "body: {body}");
    }
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_webhook_scrape_failure_returns_500() {
    let h = harness(true);
    let (status, body) = send_json(
        &h.app,
        webhook_post(Some(KEY), r#"{"website_url":"https://down.example"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "failed");
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to scrape website after 3 attempts:")
    );
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_rate_limit_applies_before_key_check() {
    let h = harness_with(false, 2, std::path::Path::new("assets"));

    for _ in 0..2 {
        let (status, _) = send_json(&h.app, webhook_post(Some("wrong"), "{}")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = send_json(
        &h.app,
        webhook_post(Some(KEY), r#"{"website_url":"https://stub.example"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({ "error": "Rate limit exceeded" }));
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rate_limit_counts_webhook_get() {
    let h = harness_with(false, 1, std::path::Path::new("assets"));

    let (first, _) = send(&h.app, get("/webhook")).await;
    let (second, _) = send(&h.app, get("/webhook")).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_probe_routes_are_not_rate_limited() {
    let h = harness_with(false, 1, std::path::Path::new("assets"));
    for _ in 0..5 {
        let (status, _) = send(&h.app, get("/test")).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_assets_served_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hello.txt"), "static content").unwrap();
    let h = harness_with(false, 10, dir.path());

    let (status, body) = send(&h.app, get("/assets/hello.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"static content");

    let (missing, _) = send(&h.app, get("/assets/absent.txt")).await;
    assert_eq!(missing, StatusCode::NOT_FOUND);
}
