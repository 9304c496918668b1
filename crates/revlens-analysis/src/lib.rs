//! Review analysis with a local language model.
//!
//! A batch of reviews is rendered into a fixed prompt, completed by a
//! [`TextCompletionEngine`] under a time budget, and the JSON object in the
//! answer is parsed into an [`revlens_core::AnalysisResult`]. Failures never
//! escape [`ReviewAnalyzer::analyze`]; they come back as sentinel results.

pub mod analyzer;
pub mod engine;
pub mod error;
pub mod extract;
pub mod llama_server;
pub mod prompt;

pub use analyzer::{InferenceSettings, LlmReviewAnalyzer, ReviewAnalyzer};
pub use engine::{drive_completion, Completion, CompletionRequest, FinishReason, TextCompletionEngine};
pub use error::EngineError;
pub use extract::{extract_result, ExtractError};
pub use llama_server::LlamaServerEngine;
pub use prompt::{build_prompt, MAX_PROMPT_REVIEWS};
