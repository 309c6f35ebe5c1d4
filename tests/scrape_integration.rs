//! Integration tests for the fetch, extract, and cache pipeline against a
//! local mock server.

use std::sync::Arc;
use std::time::Duration;

use page_scraper::{
    HttpFetcher, RateLimiter, ResultCache, RetryingScraper, ScrapeError, ScrapeService,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;

use support::socket_guard::start_mock_server_or_skip;

const PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>Integration Page</title>
  <meta name="description" content="A page served by the mock server">
</head>
<body>
  <h1>Welcome</h1>
  <h1>Second heading</h1>
  <article>
    <p>The quick brown fox jumps over the lazy dog. This paragraph exists so
    that the content extractor has enough prose to keep.</p>
    <p>Another paragraph with additional sentences, commas, and words to look
    like a real article body.</p>
  </article>
  <a href="/about">About</a>
  <a href="/contact">Contact</a>
  <a href="/about">About again</a>
  <a href="#">Top</a>
  <a href="https://elsewhere.example/">Elsewhere</a>
</body>
</html>"##;

fn service_for(fetcher: HttpFetcher, max_retries: u32) -> ScrapeService {
    ScrapeService::new(
        Arc::new(RateLimiter::default()),
        Arc::new(ResultCache::new(Duration::from_secs(3600))),
        RetryingScraper::with_max_retries(Arc::new(fetcher), max_retries),
    )
}

#[tokio::test]
async fn test_scrape_extracts_structured_page() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(HttpFetcher::new(Duration::from_secs(5)).unwrap(), 3);
    let url = format!("{}/page", mock_server.uri());

    let outcome = service.scrape(&url).await.unwrap();
    let result = outcome.result;

    assert!(!outcome.cached);
    assert_eq!(result.url, url);
    assert_eq!(result.title, "Integration Page");
    assert_eq!(result.meta_description, "A page served by the mock server");
    assert_eq!(result.headings, vec!["Welcome", "Second heading"]);
    assert_eq!(result.links.len(), 5);
    assert_eq!(result.links[0].href, "/about");
    // "/about" and "/contact" are distinct internal paths.
    assert_eq!(result.internal_link_count, 3);
    assert!(!result.main_content.is_empty());
}

#[tokio::test]
async fn test_repeated_scrape_hits_cache_not_network() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/cached"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(HttpFetcher::new(Duration::from_secs(5)).unwrap(), 3);
    let url = format!("{}/cached", mock_server.uri());

    let first = service.scrape(&url).await.unwrap();
    let second = service.scrape(&url).await.unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.result, second.result);
    assert_eq!(service.cache().len(), 1);
}

#[tokio::test]
async fn test_server_error_exhausts_every_attempt() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let service = service_for(HttpFetcher::new(Duration::from_secs(5)).unwrap(), 3);
    let url = format!("{}/broken", mock_server.uri());

    let err = service.scrape(&url).await.unwrap_err();

    assert!(matches!(err, ScrapeError::Exhausted { attempts: 3, .. }));
    assert!(
        err.to_string()
            .starts_with("Failed to scrape website after 3 attempts:")
    );
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_transient_failure_recovers_on_retry() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&mock_server)
        .await;

    let service = service_for(HttpFetcher::new(Duration::from_secs(5)).unwrap(), 3);
    let url = format!("{}/flaky", mock_server.uri());

    let outcome = service.scrape(&url).await.unwrap();

    assert_eq!(outcome.result.title, "Integration Page");
}

#[tokio::test]
async fn test_slow_page_times_out_and_fails() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PAGE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let service = service_for(HttpFetcher::new(Duration::from_secs(1)).unwrap(), 1);
    let url = format!("{}/slow", mock_server.uri());

    let err = service.scrape(&url).await.unwrap_err();

    assert_eq!(err.attempts(), 1);
    assert!(err.to_string().contains("timeout"));
}
