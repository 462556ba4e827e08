//! Configuration module for Piste-Watch
//!
//! Two inputs live here: the TOML watch configuration (target variant,
//! fetch limits, storage paths) and the JSON site catalog (which shops to
//! check, with which strategy).

mod catalog;
mod parser;
mod types;
mod validation;

// Re-export types
pub use catalog::load_catalog;
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, FetchConfig, NotifyConfig, PipelineConfig, StorageConfig, WatchConfig};
