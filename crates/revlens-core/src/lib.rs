//! Shared domain model for revlens.
//!
//! Holds the review and analysis types that flow between the scraper,
//! analysis, store and pipeline crates, the marketplace enum, the sentinel
//! vocabulary used to report failures in-band, the injected [`Reporter`]
//! observer, and environment-driven configuration.

pub mod analysis;
pub mod app_config;
pub mod config;
pub mod events;
pub mod marketplace;
pub mod review;

use thiserror::Error;

pub use analysis::{sentinel, AnalysisResult};
pub use app_config::{AppConfig, PromptLanguage};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use events::{PipelineEvent, Reporter, SharedReporter, TracingReporter};
pub use marketplace::Marketplace;
pub use review::{ProductReview, UNKNOWN_PRODUCT_ID};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
