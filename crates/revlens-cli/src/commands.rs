//! Command handlers for the CLI.

use std::time::Duration;

use anyhow::Context;
use revlens_analysis::{InferenceSettings, LlamaServerEngine, LlmReviewAnalyzer};
use revlens_core::{AppConfig, Marketplace, TracingReporter};
use revlens_pipeline::ReviewPipeline;
use revlens_scraper::{adapter_for, ScraperSettings};
use revlens_store::{JsonFileStore, ReviewStore, StoreError};

use crate::report::render_report;

/// Scrape, store and analyze one product, then print the report.
///
/// # Errors
///
/// Returns an error if the completion server is not ready, the adapter cannot
/// be built, or a document cannot be saved. Scrape and model failures are
/// reported inside the printed result instead.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    url: &str,
    marketplace: Marketplace,
    max_reviews: usize,
) -> anyhow::Result<()> {
    let engine = LlamaServerEngine::new(&config.llm_url)?;
    engine
        .health_check()
        .await
        .context("completion server is not available; start llama-server with the model loaded")?;

    let reporter = TracingReporter::shared();
    let adapter = adapter_for(
        marketplace,
        &ScraperSettings::from_app_config(config),
        reporter.clone(),
    )
    .with_context(|| format!("failed to set up the {marketplace} scraper"))?;
    let analyzer = LlmReviewAnalyzer::new(
        Box::new(engine),
        config.prompt_language,
        InferenceSettings::from_app_config(config),
        reporter.clone(),
    );
    let store = JsonFileStore::new(&config.data_dir);

    let pipeline = ReviewPipeline::new(adapter, Box::new(analyzer), Box::new(store), reporter);
    let outcome = pipeline.run(url, max_reviews).await?;

    print!(
        "{}",
        render_report(
            &outcome.result,
            Some(outcome.review_count),
            config.prompt_language
        )
    );
    if let Some(path) = &outcome.reviews_path {
        println!("reviews saved to {}", path.display());
    }
    println!("analysis saved to {}", outcome.analysis_path.display());
    Ok(())
}

/// Print the stored analysis for `product_id`.
///
/// # Errors
///
/// Returns an error if the stored document exists but cannot be read.
pub(crate) async fn run_show(config: &AppConfig, product_id: &str, json: bool) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&config.data_dir);

    let result = match store.load_analysis(product_id).await {
        Ok(result) => result,
        Err(StoreError::NotFound { .. }) => {
            println!("no analysis stored for product '{product_id}'; run `analyze` first");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let review_count = match store.load_reviews(product_id).await {
        Ok(reviews) => Some(reviews.len()),
        Err(StoreError::NotFound { .. }) => Some(0),
        Err(e) => {
            tracing::warn!(product_id, error = %e, "stored review batch is unreadable");
            None
        }
    };
    print!(
        "{}",
        render_report(&result, review_count, config.prompt_language)
    );
    Ok(())
}

/// Check the completion server and the WebDriver endpoint.
///
/// # Errors
///
/// Returns an error if either endpoint is not ready.
pub(crate) async fn run_check(config: &AppConfig) -> anyhow::Result<()> {
    let engine = LlamaServerEngine::new(&config.llm_url)?;
    let llm = engine.health_check().await;
    match &llm {
        Ok(()) => println!("{:<20}ok ({})", "completion server", config.llm_url),
        Err(e) => println!("{:<20}FAILED: {e}", "completion server"),
    }

    let webdriver = check_webdriver(&config.webdriver_url).await;
    match &webdriver {
        Ok(()) => println!("{:<20}ok ({})", "webdriver", config.webdriver_url),
        Err(e) => println!("{:<20}FAILED: {e:#}", "webdriver"),
    }

    llm.context("completion server check failed")?;
    webdriver.context("webdriver check failed")?;
    Ok(())
}

/// `GET <webdriver>/status`, which every W3C WebDriver server answers with
/// `{"value": {"ready": bool, ...}}`.
async fn check_webdriver(base_url: &str) -> anyhow::Result<()> {
    let url = format!("{}/status", base_url.trim_end_matches('/'));
    let status: serde_json::Value = reqwest::Client::new()
        .get(&url)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .with_context(|| format!("could not reach {url}"))?
        .error_for_status()?
        .json()
        .await?;

    if status["value"]["ready"].as_bool() == Some(false) {
        anyhow::bail!(
            "WebDriver at {url} is not ready: {}",
            status["value"]["message"].as_str().unwrap_or("no message")
        );
    }
    Ok(())
}
