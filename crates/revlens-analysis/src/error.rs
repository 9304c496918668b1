use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion server returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("malformed completion stream: {0}")]
    Stream(String),

    #[error("completion server at {url} is not ready: {reason}")]
    Unhealthy { url: String, reason: String },
}
