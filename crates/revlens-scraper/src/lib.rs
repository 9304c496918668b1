//! Marketplace review scraping.
//!
//! One [`MarketplaceAdapter`] per supported marketplace: Ozon pages are
//! fetched over plain HTTP, Wildberries pages are rendered in a headless
//! browser first. Adapters never fail a run; errors are reported and the
//! reviews gathered so far are returned.

pub mod adapter;
pub mod browser;
pub mod client;
pub mod dates;
pub mod error;
pub mod ozon;
pub mod pagination;
mod parse;
mod rate_limit;
pub mod wildberries;

pub use adapter::{adapter_for, MarketplaceAdapter, ScraperSettings};
pub use browser::{PageRenderer, RenderOutcome, RenderPlan, WebDriverRenderer};
pub use client::PageClient;
pub use dates::{DateResolver, EnglishDateResolver, RussianDateResolver};
pub use error::ScraperError;
pub use ozon::OzonAdapter;
pub use wildberries::WildberriesAdapter;
