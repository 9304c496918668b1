//! HTML helpers shared by the marketplace parsers.
//!
//! `scraper::Html` is not `Send`, so everything here is synchronous and takes
//! markup by reference. Adapters call these between awaits, never across one.

use regex::Regex;
use revlens_core::UNKNOWN_PRODUCT_ID;
use scraper::{ElementRef, Selector};

/// First capture group of `pattern` in `url`, or [`UNKNOWN_PRODUCT_ID`].
pub(crate) fn product_id_from(pattern: &Regex, url: &str) -> String {
    pattern
        .captures(url)
        .and_then(|c| c.get(1))
        .map_or_else(|| UNKNOWN_PRODUCT_ID.to_owned(), |m| m.as_str().to_owned())
}

/// Text of the first `selector` match under `scope`, whitespace-collapsed.
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Joins whitespace runs (including newlines from nested tags) into single spaces.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a star rating, mapping anything outside 1-5 to 0.
///
/// Accepts integers and decimal forms such as `"4.0"`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn parse_rating(raw: &str) -> u8 {
    let raw = raw.trim();
    let value = raw
        .parse::<u8>()
        .ok()
        .or_else(|| {
            raw.parse::<f32>()
                .ok()
                .filter(|v| v.fract() == 0.0 && (1.0..=5.0).contains(v))
                .map(|v| v as u8)
        })
        .unwrap_or(0);
    if (1..=5).contains(&value) {
        value
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_whitespace_joins_runs() {
        assert_eq!(collapse_whitespace("  a\n\n b\t c "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn parse_rating_accepts_in_range_values() {
        assert_eq!(parse_rating("5"), 5);
        assert_eq!(parse_rating(" 3 "), 3);
        assert_eq!(parse_rating("4.0"), 4);
    }

    #[test]
    fn parse_rating_maps_garbage_and_out_of_range_to_zero() {
        assert_eq!(parse_rating("0"), 0);
        assert_eq!(parse_rating("6"), 0);
        assert_eq!(parse_rating("4.5"), 0);
        assert_eq!(parse_rating("five"), 0);
        assert_eq!(parse_rating(""), 0);
    }
}
