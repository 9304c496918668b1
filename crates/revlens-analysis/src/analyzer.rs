//! Review batch analysis on top of a [`TextCompletionEngine`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use revlens_core::{
    sentinel, AnalysisResult, AppConfig, PipelineEvent, ProductReview, PromptLanguage,
    SharedReporter,
};

use crate::engine::{CompletionRequest, FinishReason, TextCompletionEngine};
use crate::extract::{extract_result, snippet};
use crate::prompt::{build_prompt, prompt_review_count};

/// Summarizes a batch of reviews.
///
/// Infallible by contract: every failure is encoded as a sentinel result
/// (see [`revlens_core::sentinel`]).
#[async_trait]
pub trait ReviewAnalyzer: Send + Sync {
    async fn analyze(&self, reviews: &[ProductReview]) -> AnalysisResult;
}

/// Sampling and budget parameters for analysis completions.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    pub frequency_penalty: f32,
    pub timeout: Duration,
    pub stop_sequences: Vec<String>,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.1,
            frequency_penalty: 0.5,
            timeout: Duration::from_secs(300),
            stop_sequences: vec!["}".to_owned()],
        }
    }
}

impl InferenceSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_tokens: config.llm_max_tokens,
            temperature: config.llm_temperature,
            timeout: Duration::from_secs(config.llm_timeout_secs),
            ..Self::default()
        }
    }
}

pub struct LlmReviewAnalyzer {
    engine: Box<dyn TextCompletionEngine>,
    language: PromptLanguage,
    settings: InferenceSettings,
    reporter: SharedReporter,
}

impl LlmReviewAnalyzer {
    #[must_use]
    pub fn new(
        engine: Box<dyn TextCompletionEngine>,
        language: PromptLanguage,
        settings: InferenceSettings,
        reporter: SharedReporter,
    ) -> Self {
        Self {
            engine,
            language,
            settings,
            reporter,
        }
    }

    fn request(&self, prompt: String) -> CompletionRequest {
        CompletionRequest {
            prompt,
            stop_sequences: self.settings.stop_sequences.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            frequency_penalty: self.settings.frequency_penalty,
            timeout: self.settings.timeout,
        }
    }
}

#[async_trait]
impl ReviewAnalyzer for LlmReviewAnalyzer {
    async fn analyze(&self, reviews: &[ProductReview]) -> AnalysisResult {
        if reviews.is_empty() {
            return AnalysisResult::sentinel(sentinel::NO_REVIEWS, sentinel::NO_DATA);
        }

        let prompt = build_prompt(reviews, self.language);
        self.reporter.report(PipelineEvent::AnalysisStarted {
            review_count: prompt_review_count(reviews.len()),
            prompt_chars: prompt.chars().count(),
        });

        let started = Instant::now();
        let completion = match self.engine.complete(&self.request(prompt)).await {
            Ok(completion) => completion,
            Err(e) => {
                self.reporter.report(PipelineEvent::AnalysisFailed {
                    reason: e.to_string(),
                });
                return AnalysisResult::sentinel(sentinel::ERROR, sentinel::ANALYSIS_FAILED);
            }
        };

        if completion.finish == FinishReason::Timeout {
            self.reporter.report(PipelineEvent::InferenceTimedOut {
                elapsed: started.elapsed(),
                partial_chars: completion.text.chars().count(),
            });
        }

        match extract_result(&completion.text) {
            Ok(result) => result,
            Err(e) => {
                self.reporter.report(PipelineEvent::ResponseRejected {
                    reason: e.to_string(),
                    snippet: snippet(&completion.text),
                });
                e.sentinel()
            }
        }
    }
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
