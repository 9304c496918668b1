use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use revlens_core::{AppConfig, Marketplace, ProductReview, SharedReporter};

use crate::browser::WebDriverRenderer;
use crate::client::PageClient;
use crate::dates::RussianDateResolver;
use crate::error::ScraperError;
use crate::ozon::OzonAdapter;
use crate::wildberries::WildberriesAdapter;

/// A marketplace that reviews can be scraped from.
#[async_trait]
pub trait MarketplaceAdapter: Send + Sync {
    fn marketplace(&self) -> Marketplace;

    /// Product id parsed from `url`, or [`revlens_core::UNKNOWN_PRODUCT_ID`].
    fn product_id(&self, url: &str) -> String;

    /// Collects up to `max_count` reviews for the product at `url`.
    ///
    /// Never fails: fetch errors are reported and whatever was collected
    /// before the failure is returned, possibly nothing.
    async fn fetch_reviews(&self, url: &str, max_count: usize) -> Vec<ProductReview>;
}

/// Scraper knobs derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub request_timeout: Duration,
    pub user_agent: String,
    pub inter_request_delay: Duration,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub webdriver_url: String,
    pub page_load_timeout: Duration,
    pub page_wait_timeout: Duration,
    pub debug_html_dir: Option<PathBuf>,
}

impl ScraperSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.scraper_request_timeout_secs),
            user_agent: config.scraper_user_agent.clone(),
            inter_request_delay: Duration::from_millis(config.scraper_inter_request_delay_ms),
            max_retries: config.scraper_max_retries,
            retry_backoff_base_secs: config.scraper_retry_backoff_base_secs,
            webdriver_url: config.webdriver_url.clone(),
            page_load_timeout: Duration::from_secs(config.page_load_timeout_secs),
            page_wait_timeout: Duration::from_secs(config.page_wait_timeout_secs),
            debug_html_dir: config.debug_html_dir.clone(),
        }
    }
}

/// Builds the production adapter for `marketplace`.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] if the HTTP client for the static adapter
/// cannot be built.
pub fn adapter_for(
    marketplace: Marketplace,
    settings: &ScraperSettings,
    reporter: SharedReporter,
) -> Result<Box<dyn MarketplaceAdapter>, ScraperError> {
    let adapter: Box<dyn MarketplaceAdapter> = match marketplace {
        Marketplace::Ozon => {
            let client = PageClient::new(
                settings.request_timeout,
                &settings.user_agent,
                settings.max_retries,
                settings.retry_backoff_base_secs,
            )?;
            Box::new(OzonAdapter::new(
                client,
                settings.inter_request_delay,
                Box::new(RussianDateResolver),
                reporter,
            ))
        }
        Marketplace::Wildberries => {
            let renderer = WebDriverRenderer::new(
                &settings.webdriver_url,
                &settings.user_agent,
                settings.page_load_timeout,
            );
            Box::new(
                WildberriesAdapter::new(
                    Box::new(renderer),
                    Box::new(RussianDateResolver),
                    reporter,
                )
                .with_wait_timeout(settings.page_wait_timeout)
                .with_debug_html_dir(settings.debug_html_dir.clone()),
            )
        }
    };
    Ok(adapter)
}
