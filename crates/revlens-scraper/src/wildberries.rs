//! Wildberries: the review list is rendered client-side, so pages go through
//! a [`PageRenderer`] before parsing.

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use regex::Regex;
use revlens_core::{Marketplace, PipelineEvent, ProductReview, SharedReporter};
use scraper::{ElementRef, Html, Selector};

use crate::adapter::MarketplaceAdapter;
use crate::browser::{PageRenderer, RenderOutcome, RenderPlan};
use crate::dates::DateResolver;
use crate::parse::{first_text, product_id_from};

const REVIEWS_TAB: &str = "a[href*='feedbacks']";
const REVIEW_ITEM_CSS: &str = "li.comments__item.feedback.product-feedbacks__block-wrapper";
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_LOAD_MORE_SCROLLS: usize = 10;

static PRODUCT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"catalog/(\d+)").expect("valid regex"));
static STAR_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^star([1-5])$").expect("valid regex"));

static REVIEW_LIST: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.user-activity__tab-content ul.comments__list").expect("valid selector")
});
static REVIEW_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(REVIEW_ITEM_CSS).expect("valid selector"));
static REVIEW_TEXT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.feedback__text.j-feedback__text").expect("valid selector"));
static REVIEW_RATING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.feedback__rating").expect("valid selector"));
static REVIEW_DATE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.feedback__date").expect("valid selector"));

pub struct WildberriesAdapter {
    renderer: Box<dyn PageRenderer>,
    dates: Box<dyn DateResolver>,
    reporter: SharedReporter,
    wait_timeout: Duration,
    debug_html_dir: Option<PathBuf>,
}

impl WildberriesAdapter {
    #[must_use]
    pub fn new(
        renderer: Box<dyn PageRenderer>,
        dates: Box<dyn DateResolver>,
        reporter: SharedReporter,
    ) -> Self {
        Self {
            renderer,
            dates,
            reporter,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            debug_html_dir: None,
        }
    }

    /// Upper bound on waiting for the review list to appear.
    #[must_use]
    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    /// Directory to dump rendered markup into, for selector debugging.
    #[must_use]
    pub fn with_debug_html_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.debug_html_dir = dir;
        self
    }

    fn render_plan(&self, max_count: usize) -> RenderPlan {
        RenderPlan {
            settle_delay: Duration::from_secs(3),
            warmup_scrolls: 3,
            interaction_delay: Duration::from_secs(2),
            reviews_tab_selector: Some(REVIEWS_TAB.to_owned()),
            review_item_selector: REVIEW_ITEM_CSS.to_owned(),
            wait_timeout: self.wait_timeout,
            target_items: max_count,
            max_load_more_scrolls: MAX_LOAD_MORE_SCROLLS,
        }
    }

    async fn dump_html(&self, product_id: &str, html: &str) {
        let Some(dir) = &self.debug_html_dir else {
            return;
        };
        let path = dir.join(format!("wildberries_{product_id}.html"));
        let written = match tokio::fs::create_dir_all(dir).await {
            Ok(()) => tokio::fs::write(&path, html).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => tracing::debug!(path = %path.display(), "rendered HTML dumped"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to dump rendered HTML"),
        }
    }
}

#[async_trait]
impl MarketplaceAdapter for WildberriesAdapter {
    fn marketplace(&self) -> Marketplace {
        Marketplace::Wildberries
    }

    fn product_id(&self, url: &str) -> String {
        product_id_from(&PRODUCT_ID_RE, url)
    }

    async fn fetch_reviews(&self, url: &str, max_count: usize) -> Vec<ProductReview> {
        if max_count == 0 {
            return Vec::new();
        }

        let product_id = self.product_id(url);
        let plan = self.render_plan(max_count);

        let html = match self.renderer.render(url, &plan).await {
            Ok(RenderOutcome::Rendered(html)) => html,
            Ok(RenderOutcome::TimedOut) => {
                self.reporter.report(PipelineEvent::ReviewsWaitTimedOut {
                    marketplace: Marketplace::Wildberries,
                    waited: plan.wait_timeout,
                });
                return Vec::new();
            }
            Err(e) => {
                self.reporter.report(PipelineEvent::ScrapeFailed {
                    marketplace: Marketplace::Wildberries,
                    reason: e.to_string(),
                });
                return Vec::new();
            }
        };

        self.dump_html(&product_id, &html).await;

        let now = chrono::Local::now().naive_local();
        let mut reviews = parse_review_list(&html, &product_id, self.dates.as_ref(), now);
        reviews.truncate(max_count);

        self.reporter.report(PipelineEvent::ReviewsFetched {
            marketplace: Marketplace::Wildberries,
            count: reviews.len(),
        });
        reviews
    }
}

/// Parses the rendered Wildberries review list.
///
/// Items are read from the feedback list container when present, otherwise
/// from anywhere in the document. An item without text is kept with empty
/// content.
pub(crate) fn parse_review_list(
    html: &str,
    product_id: &str,
    dates: &dyn DateResolver,
    now: NaiveDateTime,
) -> Vec<ProductReview> {
    let document = Html::parse_document(html);
    let items: Vec<ElementRef<'_>> = match document.select(&REVIEW_LIST).next() {
        Some(list) => list.select(&REVIEW_ITEM).collect(),
        None => document.select(&REVIEW_ITEM).collect(),
    };

    items
        .into_iter()
        .map(|item| {
            let content = first_text(item, &REVIEW_TEXT).unwrap_or_default();
            let date = first_text(item, &REVIEW_DATE).map(|text| dates.resolve(&text, now));
            ProductReview::new(
                content,
                star_rating(item),
                Marketplace::Wildberries.source_tag(),
                date,
                product_id,
            )
        })
        .collect()
}

/// Rating from a `starN` class on the rating span; 0 when absent.
fn star_rating(item: ElementRef<'_>) -> u8 {
    item.select(&REVIEW_RATING)
        .next()
        .and_then(|span| {
            span.value().classes().find_map(|class| {
                STAR_CLASS_RE
                    .captures(class)
                    .and_then(|c| c[1].parse::<u8>().ok())
            })
        })
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "wildberries_test.rs"]
mod tests;
