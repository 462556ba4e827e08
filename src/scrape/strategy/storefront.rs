//! Attribute-annotated storefront strategy
//!
//! For shops (PrestaShop and friends) that annotate the price with the
//! `itemprop="price"` microdata attribute. Identical to the generic chain
//! except that the microdata lookup runs before the regex fallbacks.

use super::{extract_price_chain, sku_hint_present, ChainOptions, StrategyContext};
use crate::model::{ScrapeResult, SiteConfig};

pub(super) async fn run(site: &SiteConfig, ctx: &StrategyContext) -> ScrapeResult {
    let mut result = ScrapeResult::new(site);

    tracing::info!("[{}] fetching {}", site.name, site.url);
    let page = match ctx.fetcher.get(&site.url).await {
        Ok(page) => page,
        Err(e) => {
            result.error = Some(e.to_string());
            tracing::error!("[{}] fetch failed: {}", site.name, e);
            return result;
        }
    };

    result.sku_confirmed = sku_hint_present(&page.body, &site.sku_hint);

    let opts = ChainOptions {
        check_itemprop: true,
        ..Default::default()
    };
    if !extract_price_chain(&mut result, &page.body, ctx, opts) {
        result.error = Some("price not found".to_string());
        tracing::warn!("[{}] price not found", site.name);
    }

    result
}
