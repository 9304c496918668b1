use crate::StoreError;

/// What a stored document holds. Each kind has its own folder and file
/// prefix, so a raw batch and an analysis for the same product never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Reviews,
    Analysis,
}

impl EntityKind {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Reviews => "reviews",
            EntityKind::Analysis => "analysis",
        }
    }

    #[must_use]
    pub fn folder(self) -> &'static str {
        match self {
            EntityKind::Reviews => "ParsedReviews",
            EntityKind::Analysis => "AnalysisResults",
        }
    }
}

/// `(kind, product id)` address of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    kind: EntityKind,
    product_id: String,
}

impl StoreKey {
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if `product_id` is empty or contains
    /// anything other than ASCII letters, digits, `-` and `_`.
    pub fn new(kind: EntityKind, product_id: &str) -> Result<Self, StoreError> {
        let valid = !product_id.is_empty()
            && product_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(product_id.to_owned()));
        }
        Ok(Self {
            kind,
            product_id: product_id.to_owned(),
        })
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// `{prefix}_{product_id}.json`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}_{}.json", self.kind.prefix(), self.product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_kind_prefix() {
        let reviews = StoreKey::new(EntityKind::Reviews, "123").unwrap();
        let analysis = StoreKey::new(EntityKind::Analysis, "123").unwrap();
        assert_eq!(reviews.file_name(), "reviews_123.json");
        assert_eq!(analysis.file_name(), "analysis_123.json");
        assert_ne!(reviews, analysis);
    }

    #[test]
    fn unknown_product_id_is_a_valid_key() {
        let key = StoreKey::new(EntityKind::Analysis, "unknown").unwrap();
        assert_eq!(key.file_name(), "analysis_unknown.json");
    }

    #[test]
    fn rejects_path_like_product_ids() {
        for bad in ["", "../etc", "a/b", "a b", "ид"] {
            assert!(
                matches!(StoreKey::new(EntityKind::Reviews, bad), Err(StoreError::InvalidKey(_))),
                "accepted {bad:?}"
            );
        }
    }
}
