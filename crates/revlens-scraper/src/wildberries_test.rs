use super::*;

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use revlens_core::Reporter;

use crate::dates::RussianDateResolver;
use crate::error::ScraperError;

const FIXTURE: &str = r#"
<html><body>
  <div class="user-activity__tab-content">
    <ul class="comments__list">
      <li class="comments__item feedback product-feedbacks__block-wrapper">
        <span class="feedback__rating stars-line star5"></span>
        <div class="feedback__date">Вчера, 14:30</div>
        <p class="feedback__text j-feedback__text">
          Отличные наушники,
          звук чистый
        </p>
      </li>
      <li class="comments__item feedback product-feedbacks__block-wrapper">
        <span class="feedback__rating stars-line"></span>
        <p class="feedback__text j-feedback__text">Пришли с царапиной</p>
      </li>
      <li class="comments__item feedback product-feedbacks__block-wrapper">
        <span class="feedback__rating star2"></span>
        <p class="feedback__text j-feedback__text">   </p>
      </li>
      <li class="comments__item feedback product-feedbacks__block-wrapper">
        <span class="feedback__rating star3"></span>
        <div class="feedback__date">12 марта 2024, 10:20</div>
        <p class="feedback__text j-feedback__text">Нормально за свои деньги</p>
      </li>
    </ul>
  </div>
</body></html>
"#;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 20)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap()
}

struct CannedRenderer(Mutex<Option<Result<RenderOutcome, ScraperError>>>);

impl CannedRenderer {
    fn boxed(outcome: Result<RenderOutcome, ScraperError>) -> Box<dyn PageRenderer> {
        Box::new(Self(Mutex::new(Some(outcome))))
    }
}

#[async_trait]
impl PageRenderer for CannedRenderer {
    async fn render(&self, _url: &str, _plan: &RenderPlan) -> Result<RenderOutcome, ScraperError> {
        self.0
            .lock()
            .unwrap()
            .take()
            .expect("renderer called more than once")
    }
}

#[derive(Default)]
struct Recording(Mutex<Vec<PipelineEvent>>);

impl Reporter for Recording {
    fn report(&self, event: PipelineEvent) {
        self.0.lock().unwrap().push(event);
    }
}

fn adapter(outcome: Result<RenderOutcome, ScraperError>) -> (WildberriesAdapter, Arc<Recording>) {
    let recording = Arc::new(Recording::default());
    let adapter = WildberriesAdapter::new(
        CannedRenderer::boxed(outcome),
        Box::new(RussianDateResolver),
        recording.clone(),
    );
    (adapter, recording)
}

const URL: &str = "https://www.wildberries.ru/catalog/12345678/detail.aspx";

#[test]
fn parses_rendered_review_list() {
    let reviews = parse_review_list(FIXTURE, "12345678", &RussianDateResolver, now());

    assert_eq!(reviews.len(), 4);

    let first = &reviews[0];
    assert_eq!(first.content, "Отличные наушники, звук чистый");
    assert_eq!(first.rating, 5);
    assert_eq!(first.source, "Wildberries");
    assert_eq!(first.product_id, "12345678");
    assert_eq!(
        first.date,
        NaiveDate::from_ymd_opt(2024, 5, 19).unwrap().and_hms_opt(14, 30, 0)
    );

    assert_eq!(reviews[1].rating, 0, "no starN class means unknown rating");
    assert_eq!(reviews[1].date, None);

    assert_eq!(reviews[2].content, "", "blank text is kept as empty content");
    assert_eq!(reviews[2].rating, 2);

    assert_eq!(reviews[3].rating, 3);
    assert_eq!(
        reviews[3].date,
        NaiveDate::from_ymd_opt(2024, 3, 12).unwrap().and_hms_opt(10, 20, 0)
    );
}

#[test]
fn keeps_rating_only_review_without_text_node() {
    let html = r#"<ul class="comments__list">
        <li class="comments__item feedback product-feedbacks__block-wrapper">
            <span class="feedback__rating stars-line star5"></span>
        </li>
    </ul>"#;
    let reviews = parse_review_list(html, "1", &RussianDateResolver, now());

    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].content, "");
    assert_eq!(reviews[0].rating, 5);
}

#[test]
fn falls_back_to_document_wide_items_without_list_container() {
    let html = r#"<li class="comments__item feedback product-feedbacks__block-wrapper">
        <span class="feedback__rating star4"></span>
        <p class="feedback__text j-feedback__text">Без контейнера</p>
    </li>"#;
    let reviews = parse_review_list(html, "1", &RussianDateResolver, now());
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, 4);
}

#[test]
fn product_id_from_catalog_path() {
    let (adapter, _) = adapter(Ok(RenderOutcome::TimedOut));
    assert_eq!(adapter.product_id(URL), "12345678");
    assert_eq!(
        adapter.product_id("https://www.wildberries.ru/brands/acme"),
        "unknown"
    );
}

#[tokio::test]
async fn fetch_reviews_truncates_to_max_count() {
    let (adapter, recording) = adapter(Ok(RenderOutcome::Rendered(FIXTURE.to_owned())));

    let reviews = adapter.fetch_reviews(URL, 2).await;

    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].rating, 5);
    assert!(recording.0.lock().unwrap().contains(&PipelineEvent::ReviewsFetched {
        marketplace: Marketplace::Wildberries,
        count: 2,
    }));
}

#[tokio::test]
async fn wait_timeout_yields_empty_batch() {
    let (adapter, recording) = adapter(Ok(RenderOutcome::TimedOut));
    let adapter = adapter.with_wait_timeout(Duration::from_secs(7));

    let reviews = adapter.fetch_reviews(URL, 20).await;

    assert!(reviews.is_empty());
    assert_eq!(
        recording.0.lock().unwrap().as_slice(),
        &[PipelineEvent::ReviewsWaitTimedOut {
            marketplace: Marketplace::Wildberries,
            waited: Duration::from_secs(7),
        }]
    );
}

#[tokio::test]
async fn browser_failure_yields_empty_batch() {
    let (adapter, recording) = adapter(Err(ScraperError::Browser("no chromedriver".into())));

    let reviews = adapter.fetch_reviews(URL, 20).await;

    assert!(reviews.is_empty());
    let events = recording.0.lock().unwrap();
    assert!(matches!(
        events.as_slice(),
        [PipelineEvent::ScrapeFailed { reason, .. }] if reason.contains("no chromedriver")
    ));
}

#[tokio::test]
async fn zero_max_count_does_not_render() {
    let (adapter, recording) = adapter(Err(ScraperError::Browser("must not be called".into())));
    assert!(adapter.fetch_reviews(URL, 0).await.is_empty());
    assert!(recording.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn debug_dump_writes_rendered_markup() {
    let dir = tempfile::tempdir().unwrap();
    let (adapter, _) = adapter(Ok(RenderOutcome::Rendered(FIXTURE.to_owned())));
    let adapter = adapter.with_debug_html_dir(Some(dir.path().join("debug")));

    adapter.fetch_reviews(URL, 20).await;

    let dumped = std::fs::read_to_string(dir.path().join("debug/wildberries_12345678.html")).unwrap();
    assert_eq!(dumped, FIXTURE);
}
