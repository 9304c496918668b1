//! Ozon: server-rendered review pages paginated by `?page=N`.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use regex::Regex;
use revlens_core::{Marketplace, PipelineEvent, ProductReview, SharedReporter};
use scraper::{Html, Selector};

use crate::adapter::MarketplaceAdapter;
use crate::client::PageClient;
use crate::dates::DateResolver;
use crate::error::ScraperError;
use crate::pagination::page_url;
use crate::parse::{first_text, parse_rating, product_id_from};

/// Hard stop for pagination; a product never has this many review pages.
pub const MAX_PAGES: usize = 50;

static PRODUCT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"product/(?:[\w-]*-)?(\d+)").expect("valid regex"));

static REVIEW_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".review-item").expect("valid selector"));
static REVIEW_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".review-content").expect("valid selector"));
static REVIEW_RATING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".rating[data-value]").expect("valid selector"));
static REVIEW_DATE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".review-date").expect("valid selector"));

pub struct OzonAdapter {
    client: PageClient,
    inter_request_delay: Duration,
    dates: Box<dyn DateResolver>,
    reporter: SharedReporter,
}

impl OzonAdapter {
    #[must_use]
    pub fn new(
        client: PageClient,
        inter_request_delay: Duration,
        dates: Box<dyn DateResolver>,
        reporter: SharedReporter,
    ) -> Self {
        Self {
            client,
            inter_request_delay,
            dates,
            reporter,
        }
    }

    /// Walks review pages into `out` until `max_count` is reached or a page
    /// has no review nodes.
    async fn collect_pages(
        &self,
        url: &str,
        product_id: &str,
        max_count: usize,
        out: &mut Vec<ProductReview>,
    ) -> Result<(), ScraperError> {
        for page in 1..=MAX_PAGES {
            if page > 1 {
                tokio::time::sleep(self.inter_request_delay).await;
            }

            let html = self.client.fetch_html(&page_url(url, page)?).await?;
            let now = chrono::Local::now().naive_local();
            let parsed = parse_review_page(&html, product_id, self.dates.as_ref(), now);

            self.reporter.report(PipelineEvent::PageScraped {
                marketplace: Marketplace::Ozon,
                page,
                reviews_on_page: parsed.len(),
            });

            if parsed.is_empty() {
                return Ok(());
            }

            let room = max_count - out.len();
            out.extend(parsed.into_iter().take(room));
            if out.len() >= max_count {
                return Ok(());
            }
        }

        Err(ScraperError::PaginationLimit {
            url: url.to_owned(),
            max_pages: MAX_PAGES,
        })
    }
}

#[async_trait]
impl MarketplaceAdapter for OzonAdapter {
    fn marketplace(&self) -> Marketplace {
        Marketplace::Ozon
    }

    fn product_id(&self, url: &str) -> String {
        product_id_from(&PRODUCT_ID_RE, url)
    }

    async fn fetch_reviews(&self, url: &str, max_count: usize) -> Vec<ProductReview> {
        let mut reviews = Vec::new();
        if max_count == 0 {
            return reviews;
        }

        let product_id = self.product_id(url);
        if let Err(e) = self
            .collect_pages(url, &product_id, max_count, &mut reviews)
            .await
        {
            self.reporter.report(PipelineEvent::ScrapeFailed {
                marketplace: Marketplace::Ozon,
                reason: e.to_string(),
            });
        }

        self.reporter.report(PipelineEvent::ReviewsFetched {
            marketplace: Marketplace::Ozon,
            count: reviews.len(),
        });
        reviews
    }
}

/// Parses one Ozon review page, one review per `.review-item` node.
///
/// A node without text becomes a review with empty content, so rating-only
/// reviews are kept. A missing or unparseable rating becomes 0; a missing
/// date stays unknown.
pub(crate) fn parse_review_page(
    html: &str,
    product_id: &str,
    dates: &dyn DateResolver,
    now: NaiveDateTime,
) -> Vec<ProductReview> {
    let document = Html::parse_document(html);
    let mut reviews = Vec::new();

    for item in document.select(&REVIEW_ITEM) {
        let content = first_text(item, &REVIEW_CONTENT).unwrap_or_default();
        let rating = item
            .select(&REVIEW_RATING)
            .next()
            .and_then(|el| el.value().attr("data-value"))
            .map_or(0, parse_rating);
        let date = first_text(item, &REVIEW_DATE).map(|text| dates.resolve(&text, now));

        reviews.push(ProductReview::new(
            content,
            rating,
            Marketplace::Ozon.source_tag(),
            date,
            product_id,
        ));
    }

    reviews
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::RussianDateResolver;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn parses_content_rating_and_date() {
        let html = r#"
            <div class="review-item">
              <div class="rating" data-value="4"></div>
              <div class="review-date">12 марта 2024</div>
              <div class="review-content">
                Хороший   товар,
                рекомендую
              </div>
            </div>
            <div class="review-item">
              <div class="rating" data-value="nine"></div>
              <div class="review-content">Так себе</div>
            </div>
        "#;
        let reviews = parse_review_page(html, "123", &RussianDateResolver, now());

        assert_eq!(reviews.len(), 2);
        let first = &reviews[0];
        assert_eq!(first.content, "Хороший товар, рекомендую");
        assert_eq!(first.rating, 4);
        assert_eq!(first.source, "Ozon");
        assert_eq!(first.product_id, "123");
        assert_eq!(
            first.date,
            NaiveDate::from_ymd_opt(2024, 3, 12).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(reviews[1].rating, 0);
        assert_eq!(reviews[1].date, None);
    }

    #[test]
    fn keeps_rating_only_review_with_empty_content() {
        let html = r#"
            <div class="review-item">
              <div class="rating" data-value="5"></div>
              <div class="review-content">  </div>
            </div>
            <div class="review-item"><div class="rating" data-value="3"></div></div>
        "#;
        let reviews = parse_review_page(html, "1", &RussianDateResolver, now());

        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].content, "");
        assert_eq!(reviews[0].rating, 5);
        assert_eq!(reviews[1].content, "");
        assert_eq!(reviews[1].rating, 3);
    }

    #[test]
    fn page_without_review_items_is_empty() {
        let reviews =
            parse_review_page("<html><body></body></html>", "1", &RussianDateResolver, now());
        assert!(reviews.is_empty());
    }

    #[test]
    fn product_id_pattern_handles_plain_and_slug_urls() {
        let id = |url: &str| product_id_from(&PRODUCT_ID_RE, url);
        assert_eq!(id("https://www.ozon.ru/product/123456/"), "123456");
        assert_eq!(
            id("https://www.ozon.ru/product/smartfon-xyz-128-gb-987654321/?sh=1"),
            "987654321"
        );
        assert_eq!(id("https://www.ozon.ru/category/phones/"), "unknown");
    }
}
