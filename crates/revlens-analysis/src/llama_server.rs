//! `llama.cpp` server client.
//!
//! Talks to the `/completion` endpoint with `stream: true` and turns the
//! server-sent events into text chunks for [`drive_completion`]. The model
//! itself (weights, context size, GPU layers) is configured on the server.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::engine::{drive_completion, Completion, CompletionRequest, TextCompletionEngine};
use crate::error::EngineError;

/// Sampling seed sent with every request so repeated runs are comparable.
pub const SEED: u64 = 1337;

pub struct LlamaServerEngine {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    prompt: &'a str,
    n_predict: i64,
    temperature: f32,
    stop: &'a [String],
    seed: u64,
    frequency_penalty: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    content: String,
    #[serde(default)]
    stop: bool,
    /// Set when the server itself matched a stop word; the word is not part
    /// of `content`.
    #[serde(default)]
    stopping_word: String,
}

impl LlamaServerEngine {
    /// # Errors
    ///
    /// Returns [`EngineError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Verifies the server is up and has finished loading its model.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unhealthy`] if the server is unreachable or
    /// reports a non-2xx status (llama.cpp answers 503 while loading).
    pub async fn health_check(&self) -> Result<(), EngineError> {
        let url = format!("{}/health", self.base_url);
        let unhealthy = |reason: String| EngineError::Unhealthy {
            url: url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| unhealthy(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(unhealthy(format!("status {status}: {body}")));
        }
        tracing::debug!(url, "completion server healthy");
        Ok(())
    }
}

#[async_trait]
impl TextCompletionEngine for LlamaServerEngine {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, EngineError> {
        let started = tokio::time::Instant::now();
        let body = CompletionBody {
            prompt: &request.prompt,
            n_predict: if request.max_tokens == 0 {
                -1
            } else {
                i64::from(request.max_tokens)
            },
            temperature: request.temperature,
            stop: &request.stop_sequences,
            seed: SEED,
            frequency_penalty: request.frequency_penalty,
            stream: true,
        };

        let send = self
            .client
            .post(format!("{}/completion", self.base_url))
            .json(&body)
            .send();
        let Ok(response) = tokio::time::timeout(request.timeout, send).await else {
            return Ok(Completion::timed_out(String::new()));
        };
        let response = response?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let remaining = request.timeout.saturating_sub(started.elapsed());
        drive_completion(
            SseTextStream::new(response.bytes_stream()),
            &request.stop_sequences,
            request.max_tokens,
            remaining,
        )
        .await
    }
}

/// Adapts the server's SSE byte stream into generated text chunks.
///
/// Bytes are buffered until a full line is available, so multi-byte UTF-8
/// characters split across network reads decode correctly.
pub(crate) struct SseTextStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    buffer: Vec<u8>,
    done: bool,
}

impl SseTextStream {
    pub(crate) fn new(
        byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Box::pin(byte_stream),
            buffer: Vec::new(),
            done: false,
        }
    }

    /// Pops the next complete line and decodes it into a text chunk.
    fn next_chunk(&mut self) -> Option<Result<String, EngineError>> {
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            match parse_line(&line) {
                Line::Skip => {}
                Line::Text { text, last } => {
                    self.done = last;
                    return Some(Ok(text));
                }
                Line::Error(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

impl Stream for SseTextStream {
    type Item = Result<String, EngineError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.done {
                return Poll::Ready(None);
            }
            if let Some(chunk) = this.next_chunk() {
                return Poll::Ready(Some(chunk));
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => this.buffer.extend_from_slice(&bytes),
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(EngineError::Http(e))));
                }
                Poll::Ready(None) => {
                    // Flush a final event sent without a trailing newline.
                    this.buffer.push(b'\n');
                    let chunk = this.next_chunk();
                    this.done = true;
                    return Poll::Ready(chunk);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

enum Line {
    Skip,
    Text { text: String, last: bool },
    Error(EngineError),
}

fn parse_line(raw: &[u8]) -> Line {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim(),
        Err(e) => return Line::Error(EngineError::Stream(format!("invalid UTF-8 in stream: {e}"))),
    };

    if let Some(data) = line.strip_prefix("data:") {
        return match serde_json::from_str::<StreamEvent>(data.trim()) {
            Ok(event) => {
                let mut text = event.content;
                if event.stop {
                    text.push_str(&event.stopping_word);
                }
                Line::Text {
                    text,
                    last: event.stop,
                }
            }
            Err(e) => Line::Error(EngineError::Stream(format!("unparseable event: {e}"))),
        };
    }
    if let Some(error) = line.strip_prefix("error:") {
        return Line::Error(EngineError::Stream(error.trim().to_owned()));
    }
    Line::Skip
}

#[cfg(test)]
#[path = "llama_server_test.rs"]
mod tests;
