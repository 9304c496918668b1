//! Structured status events and the observer they are reported to.
//!
//! Components receive a [`SharedReporter`] at construction instead of logging
//! to a global sink, so tests can capture exactly what a run reported.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::Marketplace;

/// Something noteworthy that happened during a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    FetchStarted {
        marketplace: Marketplace,
        product_id: String,
        max_reviews: usize,
    },
    PageScraped {
        marketplace: Marketplace,
        page: usize,
        reviews_on_page: usize,
    },
    /// Scraping stopped early; the reviews collected so far are kept.
    ScrapeFailed {
        marketplace: Marketplace,
        reason: String,
    },
    /// The dynamic review list never appeared within the wait budget.
    ReviewsWaitTimedOut {
        marketplace: Marketplace,
        waited: Duration,
    },
    ReviewsFetched {
        marketplace: Marketplace,
        count: usize,
    },
    NoReviewsFound {
        product_id: String,
    },
    Saved {
        product_id: String,
        path: PathBuf,
    },
    AnalysisStarted {
        review_count: usize,
        prompt_chars: usize,
    },
    InferenceTimedOut {
        elapsed: Duration,
        partial_chars: usize,
    },
    /// The model answered but its text could not be turned into a result.
    ResponseRejected {
        reason: String,
        snippet: String,
    },
    AnalysisFailed {
        reason: String,
    },
    AnalysisCompleted {
        product_id: String,
        overall_sentiment: String,
    },
}

/// Receives pipeline events.
pub trait Reporter: Send + Sync {
    fn report(&self, event: PipelineEvent);
}

pub type SharedReporter = Arc<dyn Reporter>;

/// Forwards every event to `tracing` at a level matching its severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
    #[must_use]
    pub fn shared() -> SharedReporter {
        Arc::new(Self)
    }
}

impl Reporter for TracingReporter {
    fn report(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::FetchStarted {
                marketplace,
                product_id,
                max_reviews,
            } => tracing::info!(%marketplace, product_id, max_reviews, "fetching reviews"),
            PipelineEvent::PageScraped {
                marketplace,
                page,
                reviews_on_page,
            } => tracing::debug!(%marketplace, page, reviews_on_page, "page scraped"),
            PipelineEvent::ScrapeFailed {
                marketplace,
                reason,
            } => tracing::warn!(%marketplace, reason, "scrape stopped early; keeping collected reviews"),
            PipelineEvent::ReviewsWaitTimedOut {
                marketplace,
                waited,
            } => tracing::warn!(
                %marketplace,
                waited_secs = waited.as_secs(),
                "timed out waiting for reviews to render"
            ),
            PipelineEvent::ReviewsFetched { marketplace, count } => {
                tracing::info!(%marketplace, count, "reviews fetched");
            }
            PipelineEvent::NoReviewsFound { product_id } => {
                tracing::warn!(product_id, "no reviews found; skipping analysis");
            }
            PipelineEvent::Saved { product_id, path } => {
                tracing::info!(product_id, path = %path.display(), "saved");
            }
            PipelineEvent::AnalysisStarted {
                review_count,
                prompt_chars,
            } => tracing::info!(review_count, prompt_chars, "starting model inference"),
            PipelineEvent::InferenceTimedOut {
                elapsed,
                partial_chars,
            } => tracing::warn!(
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                partial_chars,
                "inference timed out; parsing partial output"
            ),
            PipelineEvent::ResponseRejected { reason, snippet } => {
                tracing::error!(reason, snippet, "model response rejected");
            }
            PipelineEvent::AnalysisFailed { reason } => {
                tracing::error!(reason, "analysis failed");
            }
            PipelineEvent::AnalysisCompleted {
                product_id,
                overall_sentiment,
            } => tracing::info!(product_id, overall_sentiment, "analysis completed"),
        }
    }
}
