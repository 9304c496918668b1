//! Persistence for scraped review batches and analysis results.

pub mod json_file;
pub mod key;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use revlens_core::{AnalysisResult, ProductReview};
use thiserror::Error;

pub use json_file::JsonFileStore;
pub use key::{EntityKind, StoreKey};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid product id for storage key: {0:?}")]
    InvalidKey(String),
    #[error("no document at {}", path.display())]
    NotFound { path: PathBuf },
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("malformed document at {}: {source}", path.display())]
    Deserialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Keyed storage for the two documents a pipeline run produces.
///
/// Saving is idempotent: saving again under the same product id replaces the
/// earlier document. Save methods return where the document landed.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`StoreError`] if the batch cannot be written.
    async fn save_reviews(
        &self,
        product_id: &str,
        reviews: &[ProductReview],
    ) -> Result<PathBuf, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the result cannot be written.
    async fn save_analysis(
        &self,
        product_id: &str,
        result: &AnalysisResult,
    ) -> Result<PathBuf, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no batch was saved for `product_id`.
    async fn load_reviews(&self, product_id: &str) -> Result<Vec<ProductReview>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no result was saved for `product_id`.
    async fn load_analysis(&self, product_id: &str) -> Result<AnalysisResult, StoreError>;
}
