//! Structured-metadata extraction
//!
//! Two independent lookup paths, both best effort: JSON-LD product graphs
//! (the only source that can positively assert variant identity) and page
//! meta tags. Malformed JSON-LD blocks are skipped quietly; extraction
//! never fails a site on its own.

use crate::model::Availability;
use crate::scrape::price::normalize_price;
use scraper::{Html, Selector};
use serde_json::Value;

/// Price/availability reading taken from one product offer
#[derive(Debug, Clone, PartialEq)]
pub struct OfferReading {
    pub price: Option<f64>,
    pub availability: Availability,
    pub variant_confirmed: bool,
}

/// Collects all JSON-LD objects of `@type: Product` from the document
///
/// Looks inside `<script type="application/ld+json">` blocks: top-level
/// objects, elements of top-level arrays, and nodes under `@graph`.
pub fn jsonld_products(document: &Html) -> Vec<Value> {
    let selector =
        Selector::parse(r#"script[type="application/ld+json"]"#).expect("selector is valid");

    let mut products = Vec::new();
    for element in document.select(&selector) {
        let raw: String = element.text().collect();
        let data: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!("Skipping malformed JSON-LD block: {}", e);
                continue;
            }
        };
        collect_products(&data, &mut products);
    }
    products
}

fn collect_products(value: &Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                if is_product(item) {
                    out.push(item.clone());
                }
            }
        }
        Value::Object(_) => {
            if is_product(value) {
                out.push(value.clone());
            }
            if let Some(graph) = value.get("@graph").and_then(Value::as_array) {
                for node in graph {
                    if is_product(node) {
                        out.push(node.clone());
                    }
                }
            }
        }
        _ => {}
    }
}

fn is_product(value: &Value) -> bool {
    value.get("@type").and_then(Value::as_str) == Some("Product")
}

/// Finds the offer belonging to the target variant among the products
///
/// An offer whose `name` or `sku` contains the variant token is
/// authoritative (`variant_confirmed = true`). A product with exactly one
/// offer and no variant markers is used too, but stays unconfirmed since
/// it could be the wrong variant.
pub fn offer_for_variant(products: &[Value], variant: &str) -> Option<OfferReading> {
    for product in products {
        let offers = match product.get("offers") {
            Some(Value::Array(list)) => list.clone(),
            Some(obj @ Value::Object(_)) => vec![obj.clone()],
            _ => continue,
        };

        for offer in &offers {
            let name = text_of(offer.get("name"));
            let sku = text_of(offer.get("sku"));
            if name.contains(variant) || sku.contains(variant) {
                return Some(reading_from_offer(offer, true));
            }
        }

        if offers.len() == 1 {
            return Some(reading_from_offer(&offers[0], false));
        }
    }
    None
}

fn reading_from_offer(offer: &Value, variant_confirmed: bool) -> OfferReading {
    let price = offer.get("price").map(|p| text_of(Some(p))).and_then(|s| normalize_price(&s));
    let availability = offer
        .get("availability")
        .and_then(Value::as_str)
        .map(availability_from_schema)
        .unwrap_or(Availability::Unknown);
    OfferReading {
        price,
        availability,
        variant_confirmed,
    }
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Maps a schema.org availability string through the fixed vocabulary
///
/// Limited availability still means buyable; preorder means not on the
/// shelf. Anything unrecognized is unknown.
pub fn availability_from_schema(raw: &str) -> Availability {
    let token = raw
        .trim_start_matches("http://schema.org/")
        .trim_start_matches("https://schema.org/");
    match token {
        "InStock" | "LimitedAvailability" => Availability::InStock,
        "OutOfStock" | "PreOrder" => Availability::OutOfStock,
        _ => Availability::Unknown,
    }
}

/// Reads a price from the common meta-tag properties
pub fn meta_price(document: &Html) -> Option<f64> {
    for property in ["product:price:amount", "og:price:amount"] {
        if let Some(content) = meta_content(document, property) {
            if let Some(price) = normalize_price(&content) {
                return Some(price);
            }
        }
    }
    None
}

/// Reads availability from the `product:availability` meta tag
pub fn meta_availability(document: &Html) -> Availability {
    let Some(content) = meta_content(document, "product:availability") else {
        return Availability::Unknown;
    };
    let lowered = content.to_lowercase();
    if lowered.contains("instock") || lowered.contains("in stock") {
        Availability::InStock
    } else if lowered.contains("outofstock") || lowered.contains("out of stock") {
        Availability::OutOfStock
    } else {
        Availability::Unknown
    }
}

/// Returns the content of a `<meta property="...">` tag
pub fn meta_content(document: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[property="{}"]"#, property)).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

/// Returns the content of a `<meta name="...">` tag
pub fn meta_named_content(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[name="{}"]"#, name)).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

/// Looks up the microdata price attribute (`itemprop="price"`)
///
/// Prefers the `content` attribute, falls back to the element text.
/// Returns the normalized value with the raw text it came from.
pub fn itemprop_price(document: &Html) -> Option<(f64, String)> {
    let selector = Selector::parse(r#"[itemprop="price"]"#).expect("selector is valid");
    for element in document.select(&selector) {
        let raw = match element.value().attr("content") {
            Some(content) if !content.trim().is_empty() => content.to_string(),
            _ => element.text().collect::<String>(),
        };
        if let Some(price) = normalize_price(&raw) {
            return Some((price, raw.trim().to_string()));
        }
    }
    None
}
