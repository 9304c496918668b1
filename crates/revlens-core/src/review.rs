use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Product id used when a URL does not match the marketplace's id pattern.
pub const UNKNOWN_PRODUCT_ID: &str = "unknown";

/// One scraped customer review.
///
/// Created by a marketplace adapter during a single fetch and never mutated
/// afterwards. A batch keeps scrape order, which is not necessarily
/// chronological.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReview {
    /// Review body. Empty when the text node could not be scraped.
    #[serde(default)]
    pub content: String,
    /// Star rating 1-5, or 0 when unknown.
    #[serde(default)]
    pub rating: u8,
    /// Marketplace source tag, e.g. `"Wildberries"`.
    #[serde(default)]
    pub source: String,
    /// Review timestamp; `None` serializes as `"unknown"`.
    #[serde(default, with = "review_date")]
    pub date: Option<NaiveDateTime>,
    pub product_id: String,
}

impl ProductReview {
    /// Builds a review, mapping out-of-range ratings to 0.
    #[must_use]
    pub fn new(
        content: impl Into<String>,
        rating: u8,
        source: impl Into<String>,
        date: Option<NaiveDateTime>,
        product_id: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            rating: if rating <= 5 { rating } else { 0 },
            source: source.into(),
            date,
            product_id: product_id.into(),
        }
    }
}

/// Serializes review dates as `%Y-%m-%dT%H:%M:%S` or the literal `"unknown"`.
mod review_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
    const UNKNOWN: &str = "unknown";

    #[allow(clippy::ref_option)]
    pub(super) fn serialize<S>(date: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_str(UNKNOWN),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| {
            if s == UNKNOWN {
                None
            } else {
                NaiveDateTime::parse_from_str(&s, FORMAT).ok()
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 12)
            .unwrap()
            .and_hms_opt(10, 20, 0)
            .unwrap()
    }

    #[test]
    fn new_maps_out_of_range_rating_to_zero() {
        let review = ProductReview::new("ok", 9, "Ozon", None, "1");
        assert_eq!(review.rating, 0);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let review = ProductReview::new("Great", 5, "Wildberries", Some(sample_date()), "42");
        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(value["productId"], "42");
        assert_eq!(value["date"], "2024-03-12T10:20:00");
        assert_eq!(value["rating"], 5);
    }

    #[test]
    fn unknown_date_serializes_as_sentinel() {
        let review = ProductReview::new("", 0, "Ozon", None, "7");
        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(value["date"], "unknown");
    }

    #[test]
    fn date_survives_json_round_trip() {
        let review = ProductReview::new("Fine", 4, "Wildberries", Some(sample_date()), "42");
        let json = serde_json::to_string(&review).unwrap();
        let back: ProductReview = serde_json::from_str(&json).unwrap();
        assert_eq!(back, review);
    }

    #[test]
    fn garbage_date_deserializes_as_unknown() {
        let json = r#"{"content":"x","rating":3,"source":"Ozon","date":"yesterday-ish","productId":"1"}"#;
        let review: ProductReview = serde_json::from_str(json).unwrap();
        assert!(review.date.is_none());
    }
}
