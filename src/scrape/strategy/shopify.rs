//! Shopify platform-API strategy
//!
//! Shopify product pages have a machine-readable JSON sibling:
//! `/products/<handle>` answers on `/products/<handle>.json` with the full
//! variant list. When the endpoint works, the variant's own price and
//! availability fields are read directly and HTML parsing is skipped
//! entirely; when it doesn't, the site errors for this run.

use super::{sku_hint_present, StrategyContext};
use crate::model::{Availability, ScrapeResult, SiteConfig};
use crate::scrape::price::normalize_price;
use serde_json::Value;
use url::Url;

/// Rewrites a product page URL to its product.json sibling
///
/// Query and fragment are dropped; a trailing slash is tolerated.
pub(crate) fn product_json_url(page_url: &str) -> Result<String, url::ParseError> {
    let mut parsed = Url::parse(page_url)?;
    let path = parsed.path().trim_end_matches('/').to_string();
    let path = if path.ends_with(".json") {
        path
    } else {
        format!("{}.json", path)
    };
    parsed.set_path(&path);
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed.into())
}

/// Availability of one Shopify variant
///
/// The public product.json endpoint does not always carry the `available`
/// field; without it the stock level is unknown.
fn variant_availability(variant: &Value) -> Availability {
    match variant.get("available").and_then(Value::as_bool) {
        Some(true) => Availability::InStock,
        Some(false) => Availability::OutOfStock,
        None => Availability::Unknown,
    }
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

pub(super) async fn run(site: &SiteConfig, ctx: &StrategyContext) -> ScrapeResult {
    let mut result = ScrapeResult::new(site);

    let json_url = match product_json_url(&site.url) {
        Ok(u) => u,
        Err(e) => {
            result.error = Some(format!("invalid product URL: {}", e));
            return result;
        }
    };
    tracing::info!("[{}] product endpoint: {}", site.name, json_url);

    let page = match ctx.fetcher.get(&json_url).await {
        Ok(page) => page,
        Err(e) => {
            result.error = Some(e.to_string());
            tracing::error!("[{}] fetch failed: {}", site.name, e);
            return result;
        }
    };

    let data: Value = match serde_json::from_str(&page.body) {
        Ok(v) => v,
        Err(e) => {
            result.error = Some(format!("JSON parse error: {}", e));
            return result;
        }
    };
    let product = data.get("product").cloned().unwrap_or(Value::Null);

    // SKU hint may show up in the title, tags, or URL handle
    let tags = match product.get("tags") {
        Some(Value::Array(list)) => list
            .iter()
            .map(|t| value_text(Some(t)))
            .collect::<Vec<_>>()
            .join(" "),
        other => value_text(other),
    };
    let searchable = format!(
        "{} {} {}",
        value_text(product.get("title")),
        tags,
        value_text(product.get("handle"))
    );
    result.sku_confirmed = sku_hint_present(&searchable, &site.sku_hint);

    // Find the variant whose options or title name the target token
    let variants = product
        .get("variants")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let target = variants.iter().find(|v| {
        ["option1", "option2", "option3", "title"]
            .iter()
            .any(|field| value_text(v.get(*field)) == ctx.target_variant)
    });

    let Some(variant) = target else {
        result.error = Some(format!(
            "variant {} not found in product endpoint",
            ctx.target_variant
        ));
        tracing::warn!("[{}] {}", site.name, result.error.as_deref().unwrap_or(""));
        return result;
    };

    result.variant_confirmed = true;

    let raw_price = value_text(variant.get("price"));
    result.price = normalize_price(&raw_price);
    result.raw_price_text = Some(raw_price);
    result.availability = variant_availability(variant);

    // The variant's own sku field is a second chance to confirm the hint
    if sku_hint_present(&value_text(variant.get("sku")), &site.sku_hint) {
        result.sku_confirmed = true;
    }

    tracing::info!(
        "[{}] variant {}: price={:?}, availability={}, sku_confirmed={}",
        site.name,
        ctx.target_variant,
        result.price,
        result.availability,
        result.sku_confirmed
    );
    result
}
