mod commands;
mod report;

use clap::{Parser, Subcommand};
use revlens_core::Marketplace;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "revlens-cli")]
#[command(about = "Scrape marketplace reviews and summarize them with a local model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape, store and analyze reviews for one product
    Analyze {
        /// Product page URL
        #[arg(long)]
        url: String,

        /// Marketplace the URL belongs to (ozon, wildberries/wb, or 1/2)
        #[arg(long)]
        marketplace: Marketplace,

        /// Maximum number of reviews to collect; defaults to REVLENS_MAX_REVIEWS
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_reviews: Option<u64>,
    },
    /// Print a previously stored analysis
    Show {
        /// Product id as extracted from the product URL
        product_id: String,

        /// Print the stored JSON instead of the formatted report
        #[arg(long)]
        json: bool,
    },
    /// Check that the completion server and WebDriver endpoint are reachable
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = revlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Analyze {
            url,
            marketplace,
            max_reviews,
        } => {
            let max_reviews = match max_reviews {
                Some(n) => usize::try_from(n)?,
                None => config.max_reviews,
            };
            commands::run_analyze(&config, &url, marketplace, max_reviews).await
        }
        Commands::Show { product_id, json } => commands::run_show(&config, &product_id, json).await,
        Commands::Check => commands::run_check(&config).await,
    }
}
