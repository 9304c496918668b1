//! Integration tests for `OzonAdapter::fetch_reviews`.
//!
//! Each test stands up a `wiremock` server serving review pages under
//! `/product/<id>/?page=N`, so pagination, the count cap and partial results
//! on failure are exercised end to end without real network traffic.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use revlens_core::{Marketplace, PipelineEvent, Reporter};
use revlens_scraper::{MarketplaceAdapter, OzonAdapter, PageClient, RussianDateResolver};

#[derive(Default)]
struct Recording(Mutex<Vec<PipelineEvent>>);

impl Reporter for Recording {
    fn report(&self, event: PipelineEvent) {
        self.0.lock().unwrap().push(event);
    }
}

fn test_adapter() -> (OzonAdapter, Arc<Recording>) {
    let client = PageClient::new(Duration::from_secs(5), "revlens-test/0.1", 0, 0)
        .expect("failed to build test PageClient");
    let recording = Arc::new(Recording::default());
    let adapter = OzonAdapter::new(
        client,
        Duration::ZERO,
        Box::new(RussianDateResolver),
        recording.clone(),
    );
    (adapter, recording)
}

/// A review page with `count` items whose text is `"<prefix> <n>"`.
fn review_page(prefix: &str, count: usize) -> String {
    let items: String = (1..=count)
        .map(|n| {
            format!(
                r#"<div class="review-item">
                     <div class="rating" data-value="{rating}"></div>
                     <div class="review-content">{prefix} {n}</div>
                   </div>"#,
                rating = (n % 5) + 1
            )
        })
        .collect();
    format!("<html><body>{items}</body></html>")
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/product/777/"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn product_url(server: &MockServer) -> String {
    format!("{}/product/777/", server.uri())
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn walks_pages_until_an_empty_page() {
    let server = MockServer::start().await;
    mount_page(&server, "1", review_page("first", 3)).await;
    mount_page(&server, "2", review_page("second", 2)).await;
    mount_page(&server, "3", review_page("none", 0)).await;

    let (adapter, recording) = test_adapter();
    let reviews = adapter.fetch_reviews(&product_url(&server), 20).await;

    assert_eq!(reviews.len(), 5);
    assert_eq!(reviews[0].content, "first 1");
    assert_eq!(reviews[4].content, "second 2");
    assert!(reviews.iter().all(|r| r.product_id == "777" && r.source == "Ozon"));

    let events = recording.0.lock().unwrap();
    let pages: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::PageScraped { page, .. } => Some(*page),
            _ => None,
        })
        .collect();
    assert_eq!(pages, vec![1, 2, 3]);
    assert!(!events
        .iter()
        .any(|e| matches!(e, PipelineEvent::ScrapeFailed { .. })));
}

#[tokio::test]
async fn stops_once_max_count_is_reached() {
    let server = MockServer::start().await;
    mount_page(&server, "1", review_page("first", 3)).await;
    mount_page(&server, "2", review_page("second", 3)).await;
    Mock::given(method("GET"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(review_page("third", 3)))
        .expect(0)
        .mount(&server)
        .await;

    let (adapter, _) = test_adapter();
    let reviews = adapter.fetch_reviews(&product_url(&server), 4).await;

    assert_eq!(reviews.len(), 4);
    assert_eq!(reviews[3].content, "second 1");
}

// ---------------------------------------------------------------------------
// Failures keep what was collected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_error_returns_partial_batch() {
    let server = MockServer::start().await;
    mount_page(&server, "1", review_page("first", 2)).await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (adapter, recording) = test_adapter();
    let reviews = adapter.fetch_reviews(&product_url(&server), 20).await;

    assert_eq!(reviews.len(), 2);
    let events = recording.0.lock().unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        PipelineEvent::ScrapeFailed { marketplace: Marketplace::Ozon, reason } if reason.contains("503")
    )));
    assert_eq!(
        events.last(),
        Some(&PipelineEvent::ReviewsFetched {
            marketplace: Marketplace::Ozon,
            count: 2,
        })
    );
}

#[tokio::test]
async fn failure_on_first_page_returns_empty_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (adapter, _) = test_adapter();
    let reviews = adapter.fetch_reviews(&product_url(&server), 20).await;

    assert!(reviews.is_empty());
}

#[tokio::test]
async fn invalid_url_returns_empty_batch() {
    let (adapter, recording) = test_adapter();
    let reviews = adapter.fetch_reviews("not a url/product/1/", 20).await;

    assert!(reviews.is_empty());
    assert!(recording
        .0
        .lock()
        .unwrap()
        .iter()
        .any(|e| matches!(e, PipelineEvent::ScrapeFailed { .. })));
}

#[test]
fn product_id_unknown_when_url_has_no_id() {
    let (adapter, _) = test_adapter();
    assert_eq!(adapter.product_id("https://www.ozon.ru/product/123/"), "123");
    assert_eq!(adapter.product_id("https://www.ozon.ru/"), "unknown");
}
