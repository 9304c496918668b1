use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid product URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("pagination limit reached for {url}: exceeded {max_pages} pages")]
    PaginationLimit { url: String, max_pages: usize },

    #[error("browser session error: {0}")]
    Browser(String),
}

impl From<fantoccini::error::CmdError> for ScraperError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        ScraperError::Browser(err.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for ScraperError {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        ScraperError::Browser(format!("could not start WebDriver session: {err}"))
    }
}
