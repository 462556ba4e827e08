use serde::Deserialize;

/// Main configuration structure for Piste-Watch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub watch: WatchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// What is being tracked
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Variant token to look for (e.g. a length like "176")
    #[serde(rename = "target-variant")]
    pub target_variant: String,

    /// Default SKU hint, inherited by sites that do not set their own
    #[serde(rename = "target-sku")]
    pub target_sku: String,

    /// Prices below this are treated as page noise and rejected
    #[serde(rename = "min-plausible-price", default = "default_min_plausible_price")]
    pub min_plausible_price: f64,
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Additional attempts after the first (3 total with the default)
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base inter-attempt delay; the wait is this value times the attempt number
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Batch execution limits
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of site checks running at once
    #[serde(rename = "max-concurrent-sites", default = "default_max_concurrent_sites")]
    pub max_concurrent_sites: usize,
}

/// File locations for the catalog and the persisted run data
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Per-product catalog (preferred format)
    #[serde(rename = "items-path", default = "default_items_path")]
    pub items_path: String,

    /// Flat site list (legacy fallback format)
    #[serde(rename = "sites-path", default = "default_sites_path")]
    pub sites_path: String,

    /// Latest-snapshot map, one entry per URL
    #[serde(rename = "state-path", default = "default_state_path")]
    pub state_path: String,

    /// Capped per-shop time series
    #[serde(rename = "history-path", default = "default_history_path")]
    pub history_path: String,
}

/// Notification fan-out settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfig {
    /// ntfy.sh topic to push price changes to
    #[serde(rename = "ntfy-topic", default)]
    pub ntfy_topic: Option<String>,

    /// Send native desktop notifications
    #[serde(default)]
    pub desktop: bool,
}

fn default_min_plausible_price() -> f64 {
    100.0
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1500
}

fn default_max_concurrent_sites() -> usize {
    4
}

fn default_items_path() -> String {
    "items.json".to_string()
}

fn default_sites_path() -> String {
    "sites.json".to_string()
}

fn default_state_path() -> String {
    "state.json".to_string()
}

fn default_history_path() -> String {
    "history.json".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sites: default_max_concurrent_sites(),
        }
    }
}
