use serde::{Deserialize, Deserializer, Serialize};

/// Structured summary of one product's reviews.
///
/// Produced either by the analyzer (from model output or a failure sentinel)
/// or by the pipeline's empty-batch short-circuit. Field names serialize as
/// camelCase. Reads also accept the PascalCase keys the prompt asks the model
/// for, and a `null` list reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    #[serde(alias = "ProductId")]
    pub product_id: String,
    #[serde(alias = "OverallSentiment")]
    pub overall_sentiment: String,
    #[serde(alias = "KeyPros", deserialize_with = "null_as_empty")]
    pub key_pros: Vec<String>,
    #[serde(alias = "KeyCons", deserialize_with = "null_as_empty")]
    pub key_cons: Vec<String>,
    #[serde(alias = "CommonThemes", deserialize_with = "null_as_empty")]
    pub common_themes: Vec<String>,
    #[serde(alias = "PurchaseRecommendation")]
    pub purchase_recommendation: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl AnalysisResult {
    /// A result carrying only a sentiment/recommendation sentinel pair.
    #[must_use]
    pub fn sentinel(overall_sentiment: &str, purchase_recommendation: &str) -> Self {
        Self {
            overall_sentiment: overall_sentiment.to_owned(),
            purchase_recommendation: purchase_recommendation.to_owned(),
            ..Self::default()
        }
    }

    /// Result stored by the pipeline when the adapter found nothing.
    #[must_use]
    pub fn no_reviews_found(product_id: &str) -> Self {
        Self {
            product_id: product_id.to_owned(),
            ..Self::sentinel(sentinel::NO_REVIEWS_FOUND, sentinel::NO_DATA_AVAILABLE)
        }
    }

    /// `true` when either label is one of the reserved failure values.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        sentinel::SENTIMENT_SENTINELS.contains(&self.overall_sentiment.as_str())
            || sentinel::RECOMMENDATION_SENTINELS.contains(&self.purchase_recommendation.as_str())
    }
}

/// Reserved strings reporting empty or failed analysis in-band.
pub mod sentinel {
    pub const NO_REVIEWS: &str = "No reviews";
    pub const ERROR: &str = "Error";
    pub const PARSER_ERROR: &str = "Parser error";
    pub const NO_REVIEWS_FOUND: &str = "No reviews found";

    pub const NO_DATA: &str = "No data";
    pub const ANALYSIS_FAILED: &str = "Analysis failed";
    pub const INVALID_AI_RESPONSE: &str = "Invalid AI response";
    pub const JSON_PARSE_FAILED: &str = "JSON parse failed";
    pub const NO_DATA_AVAILABLE: &str = "No data available";

    pub const SENTIMENT_SENTINELS: &[&str] = &[NO_REVIEWS, ERROR, PARSER_ERROR, NO_REVIEWS_FOUND];
    pub const RECOMMENDATION_SENTINELS: &[&str] = &[
        NO_DATA,
        ANALYSIS_FAILED,
        INVALID_AI_RESPONSE,
        JSON_PARSE_FAILED,
        NO_DATA_AVAILABLE,
    ];
}
