//! Text completion abstraction.
//!
//! Engines turn a prompt into text under a hard time budget. Hitting the
//! budget is not an error: whatever was generated so far comes back with
//! [`FinishReason::Timeout`].

use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use crate::error::EngineError;

/// Parameters for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Generation stops right after the first of these appears in the output.
    pub stop_sequences: Vec<String>,
    /// Upper bound on generated tokens; 0 means unbounded.
    pub max_tokens: u32,
    pub temperature: f32,
    pub frequency_penalty: f32,
    /// Budget for the whole call, connection setup included.
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    StopSequence,
    MaxTokens,
    Timeout,
    EndOfStream,
}

/// Generated text and why generation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub finish: FinishReason,
}

impl Completion {
    #[must_use]
    pub fn timed_out(text: String) -> Self {
        Self {
            text,
            finish: FinishReason::Timeout,
        }
    }
}

/// A local or remote language model.
#[async_trait]
pub trait TextCompletionEngine: Send + Sync {
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine cannot be reached or its
    /// output stream is malformed. Timeouts are not errors.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, EngineError>;
}

/// Consumes a stream of generated text chunks until a stop condition.
///
/// Each chunk counts as one token. After every chunk the tail of the output
/// is scanned for stop sequences; on a match the text is cut right after the
/// stop sequence. The stream is dropped on return, which cancels whatever
/// produces it.
///
/// # Errors
///
/// Propagates the first error yielded by `stream`.
pub async fn drive_completion<S>(
    stream: S,
    stop_sequences: &[String],
    max_tokens: u32,
    timeout: Duration,
) -> Result<Completion, EngineError>
where
    S: Stream<Item = Result<String, EngineError>> + Send,
{
    let deadline = tokio::time::Instant::now() + timeout;
    let longest_stop = stop_sequences.iter().map(String::len).max().unwrap_or(0);
    let mut stream = std::pin::pin!(stream);
    let mut text = String::new();
    let mut tokens = 0u32;

    loop {
        let Ok(next) = tokio::time::timeout_at(deadline, stream.next()).await else {
            return Ok(Completion::timed_out(text));
        };
        let Some(chunk) = next else {
            return Ok(Completion {
                text,
                finish: FinishReason::EndOfStream,
            });
        };

        let scan_from = floor_char_boundary(&text, text.len().saturating_sub(longest_stop));
        text.push_str(&chunk?);

        if let Some(end) = stop_end(&text, scan_from, stop_sequences) {
            text.truncate(end);
            return Ok(Completion {
                text,
                finish: FinishReason::StopSequence,
            });
        }

        tokens += 1;
        if max_tokens > 0 && tokens >= max_tokens {
            return Ok(Completion {
                text,
                finish: FinishReason::MaxTokens,
            });
        }
    }
}

/// Byte offset just past the earliest stop sequence found at or after `from`.
fn stop_end(text: &str, from: usize, stop_sequences: &[String]) -> Option<usize> {
    let tail = &text[from..];
    stop_sequences
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| tail.find(s.as_str()).map(|pos| from + pos + s.len()))
        .min()
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
