//! Query-parameter pagination for static review pages.
//!
//! Static marketplaces expose review pages as `<product url>?page=N`. Any
//! existing query pairs on the product URL are preserved and an existing
//! `page` pair is replaced rather than duplicated.

use reqwest::Url;

use crate::error::ScraperError;

/// Query parameter carrying the 1-based page number.
pub const PAGE_PARAM: &str = "page";

/// Builds the URL of review page `page` for `product_url`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if `product_url` is not an absolute
/// URL.
pub fn page_url(product_url: &str, page: usize) -> Result<String, ScraperError> {
    let mut url = Url::parse(product_url).map_err(|e| ScraperError::InvalidUrl {
        url: product_url.to_owned(),
        reason: e.to_string(),
    })?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != PAGE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(PAGE_PARAM, &page.to_string());

    Ok(url.to_string())
}
