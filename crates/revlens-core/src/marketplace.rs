use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Marketplaces with a scraping adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    Ozon,
    Wildberries,
}

impl Marketplace {
    pub const ALL: [Marketplace; 2] = [Marketplace::Ozon, Marketplace::Wildberries];

    /// Tag stored in [`crate::ProductReview::source`].
    #[must_use]
    pub fn source_tag(self) -> &'static str {
        match self {
            Marketplace::Ozon => "Ozon",
            Marketplace::Wildberries => "Wildberries",
        }
    }
}

impl std::fmt::Display for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Marketplace::Ozon => write!(f, "ozon"),
            Marketplace::Wildberries => write!(f, "wildberries"),
        }
    }
}

impl FromStr for Marketplace {
    type Err = ConfigError;

    /// Accepts names (`ozon`, `wildberries`, `wb`) and the legacy menu
    /// numbers (`1`, `2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ozon" | "1" => Ok(Marketplace::Ozon),
            "wildberries" | "wb" | "2" => Ok(Marketplace::Wildberries),
            other => Err(ConfigError::InvalidEnvVar {
                var: "marketplace".to_string(),
                reason: format!("unsupported marketplace '{other}'"),
            }),
        }
    }
}
