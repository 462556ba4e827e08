//! Core data types shared by the whole pipeline

use crate::scrape::strategy::StrategyKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stock status of the tracked variant at one site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    Unknown,
}

impl Availability {
    /// True when the status carries actual information
    pub fn is_known(self) -> bool {
        self != Availability::Unknown
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Availability::InStock => "in_stock",
            Availability::OutOfStock => "out_of_stock",
            Availability::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One site to check, as loaded from the catalog
///
/// The strategy kind is resolved at load time; an unrecognized kind string
/// has already fallen back to [`StrategyKind::Generic`] by the time a
/// `SiteConfig` exists.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Product page URL (or platform endpoint base for API strategies)
    pub url: String,

    /// Human-readable shop name, used as the history key
    pub name: String,

    /// Which strategy checks this site
    pub kind: StrategyKind,

    /// Merchant identifier substring used as corroborating evidence
    pub sku_hint: String,
}

/// Normalized outcome of checking one site
///
/// Exactly one of these is produced per input site per run, whether the
/// check succeeded or not. A failure is carried in `error`, never thrown.
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    pub url: String,
    pub name: String,

    /// Canonical decimal price, if any extraction step found one
    pub price: Option<f64>,
    pub availability: Availability,

    /// The price is known to belong to the tracked variant, not merely
    /// "a price found on this page"
    pub variant_confirmed: bool,

    /// The SKU hint appeared somewhere in the raw response
    pub sku_confirmed: bool,

    /// The price text as it appeared on the page, where available
    pub raw_price_text: Option<String>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ScrapeResult {
    /// Creates an empty result for a site, to be filled in by its strategy
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            url: site.url.clone(),
            name: site.name.clone(),
            price: None,
            availability: Availability::Unknown,
            variant_confirmed: false,
            sku_confirmed: false,
            raw_price_text: None,
            error: None,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::strategy::StrategyKind;

    fn test_site() -> SiteConfig {
        SiteConfig {
            url: "https://example.com/product".to_string(),
            name: "Example Shop".to_string(),
            kind: StrategyKind::Generic,
            sku_hint: "RROFY08".to_string(),
        }
    }

    #[test]
    fn test_fresh_result_is_empty() {
        let result = ScrapeResult::new(&test_site());
        assert_eq!(result.price, None);
        assert_eq!(result.availability, Availability::Unknown);
        assert!(!result.variant_confirmed);
        assert!(!result.sku_confirmed);
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_availability_is_known() {
        assert!(Availability::InStock.is_known());
        assert!(Availability::OutOfStock.is_known());
        assert!(!Availability::Unknown.is_known());
    }

    #[test]
    fn test_availability_serde_names() {
        let json = serde_json::to_string(&Availability::OutOfStock).unwrap();
        assert_eq!(json, "\"out_of_stock\"");
        let back: Availability = serde_json::from_str("\"in_stock\"").unwrap();
        assert_eq!(back, Availability::InStock);
    }
}
