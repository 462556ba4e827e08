//! Generic storefront strategy
//!
//! The bare fallback chain with no site-specific step. Also serves any
//! catalog entry whose strategy kind was not recognized.

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

    if !extract_price_chain(&mut result, &page.body, ctx, ChainOptions::default()) {
        result.error = Some("price not found".to_string());
        tracing::warn!("[{}] price not found", site.name);
    }

    result
}
