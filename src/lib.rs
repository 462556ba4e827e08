//! Piste-Watch: a single-variant price and availability watcher
//!
//! This crate tracks one product variant across many independent e-commerce
//! sites. Each site is checked by a per-site strategy (platform JSON endpoint,
//! structured metadata, regex fallbacks, or an injected browser renderer),
//! producing one normalized [`model::ScrapeResult`] per site. A change
//! detector diffs the batch against the previously persisted state and the
//! resulting change list is handed to the notification dispatcher.

pub mod config;
pub mod detect;
pub mod model;
pub mod notify;
pub mod render;
pub mod report;
pub mod scrape;
pub mod storage;
pub mod watcher;

use thiserror::Error;

/// Main error type for Piste-Watch operations
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("A check is already running")]
    RunInProgress,

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to parse site catalog: {0}")]
    CatalogParse(#[from] serde_json::Error),

    #[error("Site catalog error: {0}")]
    Catalog(String),
}

/// Result type alias for Piste-Watch operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use detect::{detect_changes, ChangeKind, ChangeRecord};
pub use model::{Availability, ScrapeResult, SiteConfig};
pub use render::{PageRenderer, RenderError};
pub use scrape::strategy::StrategyKind;
pub use watcher::Watcher;
