use crate::app_config::{AppConfig, PromptLanguage};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if a value is present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let data_dir = PathBuf::from(or_default("REVLENS_DATA_DIR", "./data"));
    let log_level = or_default("REVLENS_LOG_LEVEL", "info");

    let max_reviews = parse_usize("REVLENS_MAX_REVIEWS", "20")?;
    if max_reviews == 0 {
        return Err(invalid(
            "REVLENS_MAX_REVIEWS",
            "must be greater than zero".to_string(),
        ));
    }

    let llm_url = or_default("REVLENS_LLM_URL", "http://127.0.0.1:8080");
    let llm_timeout_secs = parse_u64("REVLENS_LLM_TIMEOUT_SECS", "300")?;
    let llm_max_tokens = parse_u32("REVLENS_LLM_MAX_TOKENS", "4096")?;
    let llm_temperature = or_default("REVLENS_LLM_TEMPERATURE", "0.1")
        .parse::<f32>()
        .map_err(|e| invalid("REVLENS_LLM_TEMPERATURE", e.to_string()))?;
    if !(0.0..=2.0).contains(&llm_temperature) {
        return Err(invalid(
            "REVLENS_LLM_TEMPERATURE",
            format!("{llm_temperature} is outside 0.0..=2.0"),
        ));
    }
    let prompt_language = parse_prompt_language(&or_default("REVLENS_PROMPT_LANGUAGE", "ru"))?;

    let webdriver_url = or_default("REVLENS_WEBDRIVER_URL", "http://localhost:9515");
    let page_wait_timeout_secs = parse_u64("REVLENS_PAGE_WAIT_TIMEOUT_SECS", "20")?;
    let page_load_timeout_secs = parse_u64("REVLENS_PAGE_LOAD_TIMEOUT_SECS", "45")?;

    let scraper_request_timeout_secs = parse_u64("REVLENS_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("REVLENS_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_inter_request_delay_ms =
        parse_u64("REVLENS_SCRAPER_INTER_REQUEST_DELAY_MS", "1000")?;
    let scraper_max_retries = parse_u32("REVLENS_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("REVLENS_SCRAPER_RETRY_BACKOFF_BASE_SECS", "2")?;

    let debug_html_dir = lookup("REVLENS_DEBUG_HTML_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        data_dir,
        log_level,
        max_reviews,
        llm_url,
        llm_timeout_secs,
        llm_max_tokens,
        llm_temperature,
        prompt_language,
        webdriver_url,
        page_wait_timeout_secs,
        page_load_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_inter_request_delay_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        debug_html_dir,
    })
}

/// Parse `REVLENS_PROMPT_LANGUAGE`.
fn parse_prompt_language(s: &str) -> Result<PromptLanguage, ConfigError> {
    match s.trim().to_lowercase().as_str() {
        "ru" | "russian" => Ok(PromptLanguage::Russian),
        "en" | "english" => Ok(PromptLanguage::English),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVLENS_PROMPT_LANGUAGE".to_string(),
            reason: format!("expected 'ru' or 'en', got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
