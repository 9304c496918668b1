//! End-to-end review pipeline: scrape, persist, analyze, persist.

use std::path::PathBuf;

use revlens_analysis::ReviewAnalyzer;
use revlens_core::{AnalysisResult, PipelineEvent, SharedReporter};
use revlens_scraper::MarketplaceAdapter;
use revlens_store::{ReviewStore, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to persist {document} for product {product_id}: {source}")]
    Store {
        document: &'static str,
        product_id: String,
        source: StoreError,
    },
}

/// What one run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub product_id: String,
    pub review_count: usize,
    pub result: AnalysisResult,
    /// Raw batch location; `None` when no reviews were found.
    pub reviews_path: Option<PathBuf>,
    pub analysis_path: PathBuf,
}

/// Runs one product URL through a marketplace adapter, a store and an
/// analyzer. Steps are strictly sequential.
pub struct ReviewPipeline {
    adapter: Box<dyn MarketplaceAdapter>,
    analyzer: Box<dyn ReviewAnalyzer>,
    store: Box<dyn ReviewStore>,
    reporter: SharedReporter,
}

impl ReviewPipeline {
    #[must_use]
    pub fn new(
        adapter: Box<dyn MarketplaceAdapter>,
        analyzer: Box<dyn ReviewAnalyzer>,
        store: Box<dyn ReviewStore>,
        reporter: SharedReporter,
    ) -> Self {
        Self {
            adapter,
            analyzer,
            store,
            reporter,
        }
    }

    /// Scrapes up to `max_reviews` reviews from `url` and analyzes them.
    ///
    /// The raw batch is saved before the model runs. With no reviews, a
    /// "No reviews found" result is saved instead and the analyzer is not
    /// called. Scrape and analysis failures are reported in the result.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if either document cannot be saved.
    pub async fn run(&self, url: &str, max_reviews: usize) -> Result<PipelineOutcome, PipelineError> {
        let product_id = self.adapter.product_id(url);
        self.reporter.report(PipelineEvent::FetchStarted {
            marketplace: self.adapter.marketplace(),
            product_id: product_id.clone(),
            max_reviews,
        });

        let reviews = self.adapter.fetch_reviews(url, max_reviews).await;

        if reviews.is_empty() {
            self.reporter.report(PipelineEvent::NoReviewsFound {
                product_id: product_id.clone(),
            });
            let result = AnalysisResult::no_reviews_found(&product_id);
            let analysis_path = self.save_analysis(&product_id, &result).await?;
            return Ok(PipelineOutcome {
                product_id,
                review_count: 0,
                result,
                reviews_path: None,
                analysis_path,
            });
        }

        let reviews_path = self
            .store
            .save_reviews(&product_id, &reviews)
            .await
            .map_err(|source| PipelineError::Store {
                document: "reviews",
                product_id: product_id.clone(),
                source,
            })?;
        self.reporter.report(PipelineEvent::Saved {
            product_id: product_id.clone(),
            path: reviews_path.clone(),
        });

        let mut result = self.analyzer.analyze(&reviews).await;
        result.product_id.clone_from(&product_id);

        let analysis_path = self.save_analysis(&product_id, &result).await?;
        self.reporter.report(PipelineEvent::AnalysisCompleted {
            product_id: product_id.clone(),
            overall_sentiment: result.overall_sentiment.clone(),
        });

        Ok(PipelineOutcome {
            product_id,
            review_count: reviews.len(),
            result,
            reviews_path: Some(reviews_path),
            analysis_path,
        })
    }

    async fn save_analysis(
        &self,
        product_id: &str,
        result: &AnalysisResult,
    ) -> Result<PathBuf, PipelineError> {
        let path = self
            .store
            .save_analysis(product_id, result)
            .await
            .map_err(|source| PipelineError::Store {
                document: "analysis",
                product_id: product_id.to_owned(),
                source,
            })?;
        self.reporter.report(PipelineEvent::Saved {
            product_id: product_id.to_owned(),
            path: path.clone(),
        });
        Ok(path)
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
