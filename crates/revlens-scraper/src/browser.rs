//! Browser rendering for marketplaces that build their review list client-side.
//!
//! [`PageRenderer`] is the seam: the Wildberries adapter only needs "give me
//! the markup once the review list exists". [`WebDriverRenderer`] drives a real
//! headless Chrome through a WebDriver endpoint; tests substitute canned HTML.

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;

use crate::error::ScraperError;

/// How to coax a dynamic page into rendering its reviews.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    /// Pause after navigation before interacting with the page.
    pub settle_delay: Duration,
    /// Scrolls to 80% of the page height performed before looking for reviews.
    pub warmup_scrolls: usize,
    /// Pause after each scroll and click.
    pub interaction_delay: Duration,
    /// Element clicked to open the reviews tab, if present.
    pub reviews_tab_selector: Option<String>,
    /// Element whose appearance means reviews have rendered.
    pub review_item_selector: String,
    /// Upper bound on waiting for `review_item_selector`.
    pub wait_timeout: Duration,
    /// Stop loading more once this many review items are on the page.
    pub target_items: usize,
    /// Extra scrolls to the bottom used to lazy-load more reviews.
    pub max_load_more_scrolls: usize,
}

/// Result of rendering a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Fully rendered document markup.
    Rendered(String),
    /// The review list never appeared within [`RenderPlan::wait_timeout`].
    TimedOut,
}

/// Loads a page in a controlled browser and returns its rendered markup.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] when the browser session cannot be
    /// started or a navigation command fails.
    async fn render(&self, url: &str, plan: &RenderPlan) -> Result<RenderOutcome, ScraperError>;
}

/// Headless Chrome via a W3C WebDriver server (e.g. `chromedriver`).
///
/// A fresh session is opened per call and closed on every exit path, so no
/// browser state leaks between pipeline runs.
#[derive(Debug, Clone)]
pub struct WebDriverRenderer {
    webdriver_url: String,
    user_agent: String,
    page_load_timeout: Duration,
}

impl WebDriverRenderer {
    #[must_use]
    pub fn new(webdriver_url: &str, user_agent: &str, page_load_timeout: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.to_owned(),
            user_agent: user_agent.to_owned(),
            page_load_timeout,
        }
    }

    fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".to_owned(),
            json!({
                "args": [
                    "--headless=new",
                    "--disable-gpu",
                    "--no-sandbox",
                    "--disable-dev-shm-usage",
                    "--disable-blink-features=AutomationControlled",
                    format!("--user-agent={}", self.user_agent),
                ],
                "excludeSwitches": ["enable-automation"],
                "useAutomationExtension": false,
            }),
        );
        caps
    }

    async fn drive(
        &self,
        client: &Client,
        url: &str,
        plan: &RenderPlan,
    ) -> Result<RenderOutcome, ScraperError> {
        client
            .update_timeouts(TimeoutConfiguration::new(
                None,
                Some(self.page_load_timeout),
                None,
            ))
            .await?;
        client.goto(url).await?;
        tracing::debug!(url, "navigated");
        tokio::time::sleep(plan.settle_delay).await;

        for _ in 0..plan.warmup_scrolls {
            client
                .execute(
                    "window.scrollTo(0, document.body.scrollHeight * 0.8);",
                    vec![],
                )
                .await?;
            tokio::time::sleep(plan.interaction_delay).await;
        }

        if let Some(tab) = &plan.reviews_tab_selector {
            match client.find(Locator::Css(tab)).await {
                Ok(element) => {
                    element.click().await?;
                    tokio::time::sleep(plan.interaction_delay).await;
                }
                Err(e) => tracing::warn!(selector = %tab, error = %e, "reviews tab not found"),
            }
        }

        let wait = client
            .wait()
            .at_most(plan.wait_timeout)
            .for_element(Locator::Css(&plan.review_item_selector))
            .await;
        match wait {
            Ok(_) => {}
            Err(CmdError::WaitTimeout) => return Ok(RenderOutcome::TimedOut),
            Err(e) => return Err(e.into()),
        }

        let mut seen = count_items(client, &plan.review_item_selector).await?;
        for _ in 0..plan.max_load_more_scrolls {
            if seen >= plan.target_items {
                break;
            }
            client
                .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
                .await?;
            tokio::time::sleep(plan.interaction_delay).await;
            let now_seen = count_items(client, &plan.review_item_selector).await?;
            if now_seen <= seen {
                break;
            }
            seen = now_seen;
        }
        tracing::debug!(url, items = seen, "review list rendered");

        Ok(RenderOutcome::Rendered(client.source().await?))
    }
}

async fn count_items(client: &Client, selector: &str) -> Result<usize, ScraperError> {
    Ok(client.find_all(Locator::Css(selector)).await?.len())
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    async fn render(&self, url: &str, plan: &RenderPlan) -> Result<RenderOutcome, ScraperError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        let client = builder.connect(&self.webdriver_url).await?;

        let outcome = self.drive(&client, url, plan).await;

        if let Err(e) = client.close().await {
            tracing::warn!(error = %e, "failed to close WebDriver session");
        }
        outcome
    }
}
