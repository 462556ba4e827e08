//! Per-site scraping strategies
//!
//! Every site family gets one strategy variant; all of them share the same
//! fallback chain and differ only in the step they add on top of it:
//!
//! 1. fetch the page (or platform endpoint)
//! 2. SKU-hint containment check against the raw response
//! 3. JSON-LD product/offer metadata
//! 4. meta tags
//! 5. site-specific lookup (platform endpoint fields, `itemprop` attribute)
//! 6. proximity regex around the variant token
//! 7. whole-page regex, accepted but never variant-confirmed
//!
//! A strategy never fails the batch; whatever goes wrong ends up in the
//! result's `error` field.

mod aggregator;
mod generic;
mod rendered;
mod shopify;
mod storefront;

use crate::model::{ScrapeResult, SiteConfig};
use crate::render::PageRenderer;
use crate::scrape::extract;
use crate::scrape::fetcher::Fetcher;
use crate::scrape::price::find_price_in_text;
use scraper::Html;
use std::sync::Arc;

/// Closed set of strategy kinds; the catalog resolves unknown names to
/// [`StrategyKind::Generic`] at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Storefront platform with a machine-readable product endpoint
    Shopify,
    /// Storefront annotated with microdata price attributes
    Storefront,
    /// Price aggregator; listings are never variant-specific
    Aggregator,
    /// JavaScript-rendered page, needs the browser capability
    Rendered,
    /// Most defensive chain; also the fallback for unknown kinds
    Generic,
}

impl StrategyKind {
    /// Resolves a configured kind string, falling back to Generic
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "shopify" | "platform-api" => StrategyKind::Shopify,
            "storefront" | "prestashop" => StrategyKind::Storefront,
            "aggregator" | "ceneo" => StrategyKind::Aggregator,
            "rendered" | "browser" | "playwright" => StrategyKind::Rendered,
            "generic" => StrategyKind::Generic,
            other => {
                tracing::warn!(
                    "Unknown strategy kind '{}', falling back to generic",
                    other
                );
                StrategyKind::Generic
            }
        }
    }
}

/// Everything a strategy needs besides the site itself
///
/// Cloned into each site-check task; the fetcher (and its cookie session)
/// is shared across all of them.
#[derive(Clone)]
pub struct StrategyContext {
    pub fetcher: Arc<Fetcher>,
    pub renderer: Option<Arc<dyn PageRenderer>>,
    /// Variant token to look for, e.g. a length like "176"
    pub target_variant: String,
    /// Floor below which a bare-text price is treated as noise
    pub min_plausible_price: f64,
}

/// Runs the strategy configured for a site, producing exactly one result
pub async fn run_strategy(site: &SiteConfig, ctx: &StrategyContext) -> ScrapeResult {
    match site.kind {
        StrategyKind::Shopify => shopify::run(site, ctx).await,
        StrategyKind::Storefront => storefront::run(site, ctx).await,
        StrategyKind::Aggregator => aggregator::run(site, ctx).await,
        StrategyKind::Rendered => rendered::run(site, ctx).await,
        StrategyKind::Generic => generic::run(site, ctx).await,
    }
}

/// Tuning knobs for the shared extraction chain
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ChainOptions {
    /// Also try the `itemprop="price"` microdata attribute
    pub check_itemprop: bool,
    /// Never set `variant_confirmed`, whatever the source says
    pub force_unconfirmed: bool,
}

/// SKU-hint containment check against raw response text
pub(crate) fn sku_hint_present(body: &str, hint: &str) -> bool {
    !hint.trim().is_empty() && body.to_uppercase().contains(&hint.to_uppercase())
}

/// Runs the shared extraction chain over fetched HTML
///
/// Fills in price/availability/confirmation on the result and returns true
/// as soon as one step produces a price. The caller decides what a fully
/// exhausted chain means (usually `error = "price not found"`).
pub(crate) fn extract_price_chain(
    result: &mut ScrapeResult,
    html: &str,
    ctx: &StrategyContext,
    opts: ChainOptions,
) -> bool {
    let document = Html::parse_document(html);
    let variant = ctx.target_variant.as_str();

    // Structured metadata is the only source that can assert variant identity
    let products = extract::jsonld_products(&document);
    if let Some(reading) = extract::offer_for_variant(&products, variant) {
        if let Some(price) = reading.price {
            result.price = Some(price);
            result.availability = reading.availability;
            result.variant_confirmed = reading.variant_confirmed && !opts.force_unconfirmed;
            tracing::info!(
                "[{}] price from JSON-LD: {} ({})",
                result.name,
                price,
                result.availability
            );
            return true;
        }
    }

    if let Some(price) = extract::meta_price(&document) {
        result.price = Some(price);
        result.availability = extract::meta_availability(&document);
        tracing::info!("[{}] price from meta tags: {}", result.name, price);
        return true;
    }

    if opts.check_itemprop {
        if let Some((price, raw)) = extract::itemprop_price(&document) {
            result.price = Some(price);
            result.raw_price_text = Some(raw);
            result.variant_confirmed = !opts.force_unconfirmed && html.contains(variant);
            tracing::info!("[{}] price from itemprop: {}", result.name, price);
            return true;
        }
    }

    // Proximity regex: a price within a bounded window around the variant token
    if let Some(idx) = html.find(variant) {
        let snippet = window_around(html, idx, 300, 600);
        if let Some((price, raw)) = find_price_in_text(snippet, ctx.min_plausible_price) {
            result.price = Some(price);
            result.raw_price_text = Some(raw);
            result.variant_confirmed = !opts.force_unconfirmed;
            tracing::info!(
                "[{}] price from regex near '{}': {}",
                result.name,
                variant,
                price
            );
            return true;
        }
    }

    // Last resort: any price anywhere on the page, variant identity unknown
    if let Some((price, raw)) = find_price_in_text(html, ctx.min_plausible_price) {
        result.price = Some(price);
        result.raw_price_text = Some(raw);
        result.variant_confirmed = false;
        tracing::info!(
            "[{}] price from whole-page regex: {} (variant unconfirmed)",
            result.name,
            price
        );
        return true;
    }

    false
}

/// Takes a window of text around a byte offset, snapped to char boundaries
pub(crate) fn window_around(text: &str, idx: usize, before: usize, after: usize) -> &str {
    let mut start = idx.saturating_sub(before);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = idx.saturating_add(after).min(text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::model::Availability;

    pub(crate) fn test_context() -> StrategyContext {
        StrategyContext {
            fetcher: Arc::new(Fetcher::new(&FetchConfig::default()).unwrap()),
            renderer: None,
            target_variant: "176".to_string(),
            min_plausible_price: 100.0,
        }
    }

    fn test_site(kind: StrategyKind) -> SiteConfig {
        SiteConfig {
            url: "https://example.com/p".to_string(),
            name: "Example".to_string(),
            kind,
            sku_hint: "RROFY08".to_string(),
        }
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(StrategyKind::from_name("shopify"), StrategyKind::Shopify);
        assert_eq!(StrategyKind::from_name("Aggregator"), StrategyKind::Aggregator);
        assert_eq!(StrategyKind::from_name("rendered"), StrategyKind::Rendered);
        assert_eq!(StrategyKind::from_name("prestashop"), StrategyKind::Storefront);
    }

    #[test]
    fn test_unknown_kind_falls_back_to_generic() {
        assert_eq!(StrategyKind::from_name("magento9000"), StrategyKind::Generic);
        assert_eq!(StrategyKind::from_name(""), StrategyKind::Generic);
    }

    #[test]
    fn test_sku_hint_check_is_case_insensitive() {
        assert!(sku_hint_present("... rrofy08 ...", "RROFY08"));
        assert!(!sku_hint_present("nothing here", "RROFY08"));
        assert!(!sku_hint_present("anything", "  "));
    }

    #[test]
    fn test_window_around_respects_char_boundaries() {
        let text = "żółw 176 cm żółw żółw";
        let idx = text.find("176").unwrap();
        // Offsets that would split a multi-byte char must be snapped
        let window = window_around(text, idx, 3, 300);
        assert!(window.contains("176"));
        let window = window_around(text, idx, 300, 5);
        assert!(window.contains("176"));
    }

    #[test]
    fn test_chain_prefers_jsonld_over_meta() {
        let html = r#"<html><head>
        <script type="application/ld+json">
            {"@type": "Product", "offers": [{"name": "176 cm", "price": "2499.00", "availability": "InStock"}]}
        </script>
        <meta property="og:price:amount" content="1111.00" />
        </head><body></body></html>"#;

        let ctx = test_context();
        let mut result = ScrapeResult::new(&test_site(StrategyKind::Generic));
        assert!(extract_price_chain(&mut result, html, &ctx, ChainOptions::default()));
        assert_eq!(result.price, Some(2499.00));
        assert_eq!(result.availability, Availability::InStock);
        assert!(result.variant_confirmed);
    }

    #[test]
    fn test_chain_meta_fallback_is_unconfirmed() {
        let html = r#"<html><head>
            <meta property="product:price:amount" content="1 899,00" />
            <meta property="product:availability" content="instock" />
        </head><body>176 cm</body></html>"#;

        let ctx = test_context();
        let mut result = ScrapeResult::new(&test_site(StrategyKind::Generic));
        assert!(extract_price_chain(&mut result, html, &ctx, ChainOptions::default()));
        assert_eq!(result.price, Some(1899.00));
        assert_eq!(result.availability, Availability::InStock);
        assert!(!result.variant_confirmed);
    }

    #[test]
    fn test_chain_proximity_regex_confirms_variant() {
        let html = r#"<html><body>
            <div>Rossignol Arcade 82, 176 cm, cena 2 349,00 zł</div>
        </body></html>"#;

        let ctx = test_context();
        let mut result = ScrapeResult::new(&test_site(StrategyKind::Generic));
        assert!(extract_price_chain(&mut result, html, &ctx, ChainOptions::default()));
        assert_eq!(result.price, Some(2349.00));
        assert!(result.variant_confirmed);
    }

    #[test]
    fn test_chain_whole_page_regex_never_confirms() {
        // Variant token absent, a price exists elsewhere on the page
        let html = r#"<html><body>
            <div>inny model: 1 599,00 zł</div>
        </body></html>"#;

        let ctx = test_context();
        let mut result = ScrapeResult::new(&test_site(StrategyKind::Generic));
        assert!(extract_price_chain(&mut result, html, &ctx, ChainOptions::default()));
        assert_eq!(result.price, Some(1599.00));
        assert!(!result.variant_confirmed);
    }

    #[test]
    fn test_chain_rejects_implausible_prices() {
        let html = r#"<html><body><div>ocena 4,99 / 5</div></body></html>"#;

        let ctx = test_context();
        let mut result = ScrapeResult::new(&test_site(StrategyKind::Generic));
        assert!(!extract_price_chain(&mut result, html, &ctx, ChainOptions::default()));
        assert_eq!(result.price, None);
    }

    #[test]
    fn test_chain_force_unconfirmed() {
        let html = r#"<html><head>
        <script type="application/ld+json">
            {"@type": "Product", "offers": [{"name": "176 cm", "price": "2499.00"}]}
        </script>
        </head><body></body></html>"#;

        let ctx = test_context();
        let mut result = ScrapeResult::new(&test_site(StrategyKind::Aggregator));
        let opts = ChainOptions {
            force_unconfirmed: true,
            ..Default::default()
        };
        assert!(extract_price_chain(&mut result, html, &ctx, opts));
        assert_eq!(result.price, Some(2499.00));
        assert!(!result.variant_confirmed);
    }
}
