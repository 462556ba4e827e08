//! Price-aggregator strategy
//!
//! Aggregators show the lowest price across many unrelated third-party
//! listings, so a price found here is never the tracked variant's price
//! with certainty: `variant_confirmed` stays false on every path. The page
//! description ("od 1 999,99 zł" and similar) is often the only populated
//! source and is tried ahead of structured metadata.

use super::{extract_price_chain, sku_hint_present, ChainOptions, StrategyContext};
use crate::model::{ScrapeResult, SiteConfig};
use crate::scrape::extract::{meta_content, meta_named_content};
use crate::scrape::price::normalize_price;
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;
use url::Url;

/// "from <price>" pattern in listing descriptions
static FROM_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"od\s+([\d\s\x{00a0}]+[,.]\d{2})\s*z").expect("from-price regex is valid")
});

/// Bare "<price> zł" pattern, tried when there is no "from" prefix
static BARE_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\d\s\x{00a0}]+[,.]\d{2})\s*z").expect("bare-price regex is valid")
});

/// Pulls the minimum listing price out of a description string
pub(crate) fn price_from_description(description: &str) -> Option<(f64, String)> {
    let capture = FROM_PRICE_RE
        .captures(description)
        .or_else(|| BARE_PRICE_RE.captures(description))?;
    let raw = capture.get(1)?.as_str();
    normalize_price(raw).map(|value| (value, raw.trim().to_string()))
}

pub(super) async fn run(site: &SiteConfig, ctx: &StrategyContext) -> ScrapeResult {
    let mut result = ScrapeResult::new(site);

    tracing::info!("[{}] fetching {}", site.name, site.url);
    // Aggregators gate harder on missing referers than shops do
    let referer = Url::parse(&site.url)
        .ok()
        .and_then(|u| u.host_str().map(|h| format!("https://{}/", h)));
    let fetched = match referer {
        Some(ref referer) => {
            ctx.fetcher
                .get_with_headers(&site.url, &[("Referer", referer)])
                .await
        }
        None => ctx.fetcher.get(&site.url).await,
    };
    let page = match fetched {
        Ok(page) => page,
        Err(e) => {
            result.error = Some(e.to_string());
            tracing::error!("[{}] fetch failed: {}", site.name, e);
            return result;
        }
    };

    result.sku_confirmed = sku_hint_present(&page.body, &site.sku_hint);

    // Listing description first: often the only populated source here
    let document = Html::parse_document(&page.body);
    let description = meta_content(&document, "og:description")
        .or_else(|| meta_named_content(&document, "description"));
    if let Some(description) = description {
        if let Some((price, raw)) = price_from_description(&description) {
            result.price = Some(price);
            result.raw_price_text = Some(raw);
            tracing::info!(
                "[{}] price from description: {} (aggregator, variant unconfirmed)",
                site.name,
                price
            );
            return result;
        }
    }

    let opts = ChainOptions {
        force_unconfirmed: true,
        ..Default::default()
    };
    if !extract_price_chain(&mut result, &page.body, ctx, opts) {
        result.error = Some("price not found".to_string());
        tracing::warn!("[{}] price not found", site.name);
    }

    // An aggregator price is a minimum across listings, never a variant price
    debug_assert!(!result.variant_confirmed);

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_price_pattern() {
        let (price, raw) = price_from_description("Narty Rossignol od 1 999,99 zł w 12 sklepach").unwrap();
        assert_eq!(price, 1999.99);
        assert_eq!(raw, "1 999,99");
    }

    #[test]
    fn test_bare_price_pattern() {
        let (price, _) = price_from_description("Cena 2\u{a0}120,00 zł z dostawą").unwrap();
        assert_eq!(price, 2120.00);
    }

    #[test]
    fn test_from_prefix_wins_over_bare() {
        // Both patterns match; the "od" (from) price is the aggregated minimum
        let (price, _) = price_from_description("od 1 749,99 zł, najdrożej 2 499,00 zł").unwrap();
        assert_eq!(price, 1749.99);
    }

    #[test]
    fn test_no_price_in_description() {
        assert_eq!(price_from_description("najlepsze narty sezonu"), None);
    }
}
