//! Site catalog loading
//!
//! The catalog says which shops to check. Two formats are accepted:
//! `items.json`, a list of tracked products each carrying its own sites
//! (sites inherit the product's `sku_hint` when they don't set one), and
//! `sites.json`, the older flat list of sites. `items.json` wins when both
//! exist. The catalog itself is maintained by an external collaborator;
//! this module only reads it.

use crate::config::types::StorageConfig;
use crate::model::SiteConfig;
use crate::scrape::strategy::StrategyKind;
use crate::ConfigError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawSite {
    url: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    parser: Option<String>,
    #[serde(default)]
    sku_hint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    sku_hint: Option<String>,
    #[serde(default)]
    sites: Vec<RawSite>,
}

/// Loads the site catalog, preferring the per-product format
///
/// # Arguments
///
/// * `storage` - Storage config naming the catalog file locations
/// * `default_sku` - SKU hint applied to sites that specify none
///
/// # Returns
///
/// * `Ok(Vec<SiteConfig>)` - At least one site, in catalog order
/// * `Err(ConfigError)` - No catalog file found, or the catalog is malformed
pub fn load_catalog(storage: &StorageConfig, default_sku: &str) -> Result<Vec<SiteConfig>, ConfigError> {
    let items_path = Path::new(&storage.items_path);
    if items_path.exists() {
        match load_items(items_path, default_sku) {
            Ok(sites) if !sites.is_empty() => {
                tracing::info!("Loaded {} sites from {}", sites.len(), storage.items_path);
                return Ok(sites);
            }
            Ok(_) => {
                tracing::warn!("{} contains no sites, trying {}", storage.items_path, storage.sites_path);
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}, trying {}", storage.items_path, e, storage.sites_path);
            }
        }
    }

    let sites_path = Path::new(&storage.sites_path);
    if !sites_path.exists() {
        return Err(ConfigError::Catalog(format!(
            "neither {} nor {} exists",
            storage.items_path, storage.sites_path
        )));
    }

    let sites = load_sites(sites_path, default_sku)?;
    if sites.is_empty() {
        return Err(ConfigError::Catalog(format!(
            "{} contains no sites",
            storage.sites_path
        )));
    }
    tracing::info!("Loaded {} sites from {}", sites.len(), storage.sites_path);
    Ok(sites)
}

fn load_items(path: &Path, default_sku: &str) -> Result<Vec<SiteConfig>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let items: Vec<RawItem> = serde_json::from_str(&content)?;

    let mut sites = Vec::new();
    for item in items {
        for site in item.sites {
            let inherited = site.sku_hint.or_else(|| item.sku_hint.clone());
            sites.push(resolve_site(site.url, site.name, site.parser, inherited, default_sku));
        }
    }
    Ok(sites)
}

fn load_sites(path: &Path, default_sku: &str) -> Result<Vec<SiteConfig>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let raw: Vec<RawSite> = serde_json::from_str(&content)?;

    Ok(raw
        .into_iter()
        .map(|s| resolve_site(s.url, s.name, s.parser, s.sku_hint, default_sku))
        .collect())
}

fn resolve_site(
    url: String,
    name: Option<String>,
    parser: Option<String>,
    sku_hint: Option<String>,
    default_sku: &str,
) -> SiteConfig {
    // Unknown strategy kinds resolve to Generic here, at load time
    let kind = match parser {
        Some(ref p) => StrategyKind::from_name(p),
        None => StrategyKind::Generic,
    };
    let name = name.unwrap_or_else(|| url.clone());
    let sku_hint = sku_hint.unwrap_or_else(|| default_sku.to_string());
    SiteConfig {
        url,
        name,
        kind,
        sku_hint,
    }
}
