//! Recovering an [`AnalysisResult`] from free-form model output.

use revlens_core::{sentinel, AnalysisResult};
use thiserror::Error;

/// Log snippets of rejected output are cut to this many characters.
pub const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// No `{ ... }` span in the output.
    #[error("no JSON object found in model output")]
    Format,

    #[error("model output is not a valid analysis object: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ExtractError {
    /// The in-band result recorded in place of a real analysis.
    #[must_use]
    pub fn sentinel(&self) -> AnalysisResult {
        match self {
            ExtractError::Format => {
                AnalysisResult::sentinel(sentinel::PARSER_ERROR, sentinel::INVALID_AI_RESPONSE)
            }
            ExtractError::Parse(_) => {
                AnalysisResult::sentinel(sentinel::PARSER_ERROR, sentinel::JSON_PARSE_FAILED)
            }
        }
    }
}

/// The span from the first `{` through the last `}`.
///
/// Braces in prose surrounding the real object widen the span and usually
/// make it unparseable.
#[must_use]
pub fn json_slice(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Parses the model's answer into an [`AnalysisResult`], verbatim.
///
/// # Errors
///
/// [`ExtractError::Format`] when no object span exists,
/// [`ExtractError::Parse`] when the span does not deserialize.
pub fn extract_result(raw: &str) -> Result<AnalysisResult, ExtractError> {
    let json = json_slice(raw).ok_or(ExtractError::Format)?;
    tracing::debug!(json, "extracted JSON from model output");
    Ok(serde_json::from_str(json)?)
}

/// First [`SNIPPET_CHARS`] characters of `raw`, with `...` when cut.
#[must_use]
pub fn snippet(raw: &str) -> String {
    match raw.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &raw[..cut]),
        None => raw.to_owned(),
    }
}
