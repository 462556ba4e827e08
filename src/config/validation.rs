use crate::config::types::{Config, FetchConfig, PipelineConfig, StorageConfig, WatchConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_watch_config(&config.watch)?;
    validate_fetch_config(&config.fetch)?;
    validate_pipeline_config(&config.pipeline)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

fn validate_watch_config(config: &WatchConfig) -> Result<(), ConfigError> {
    if config.target_variant.trim().is_empty() {
        return Err(ConfigError::Validation(
            "target-variant cannot be empty".to_string(),
        ));
    }

    if config.target_sku.trim().is_empty() {
        return Err(ConfigError::Validation(
            "target-sku cannot be empty".to_string(),
        ));
    }

    if !config.min_plausible_price.is_finite() || config.min_plausible_price < 0.0 {
        return Err(ConfigError::Validation(format!(
            "min-plausible-price must be a non-negative number, got {}",
            config.min_plausible_price
        )));
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_sites < 1 || config.max_concurrent_sites > 64 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-sites must be between 1 and 64, got {}",
            config.max_concurrent_sites
        )));
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.state_path.is_empty() {
        return Err(ConfigError::Validation(
            "state-path cannot be empty".to_string(),
        ));
    }

    if config.history_path.is_empty() {
        return Err(ConfigError::Validation(
            "history-path cannot be empty".to_string(),
        ));
    }

    if config.state_path == config.history_path {
        return Err(ConfigError::Validation(
            "state-path and history-path must differ".to_string(),
        ));
    }

    Ok(())
}
