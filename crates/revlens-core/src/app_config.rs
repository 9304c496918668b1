use std::path::PathBuf;

/// Language of the analysis prompt and of the label vocabulary the model is
/// asked to answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptLanguage {
    #[default]
    Russian,
    English,
}

impl std::fmt::Display for PromptLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptLanguage::Russian => write!(f, "ru"),
            PromptLanguage::English => write!(f, "en"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub max_reviews: usize,
    pub llm_url: String,
    pub llm_timeout_secs: u64,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    pub prompt_language: PromptLanguage,
    pub webdriver_url: String,
    pub page_wait_timeout_secs: u64,
    pub page_load_timeout_secs: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_inter_request_delay_ms: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    pub debug_html_dir: Option<PathBuf>,
}
