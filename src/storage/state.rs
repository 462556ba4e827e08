//! Latest-snapshot state, one entry per tracked URL

use crate::model::{Availability, ScrapeResult};
use crate::storage::{write_json_atomically, StorageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The persisted subset of a scrape result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    pub price: Option<f64>,
    pub availability: Availability,
    pub variant_confirmed: bool,
    pub sku_confirmed: bool,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
}

impl From<&ScrapeResult> for StateEntry {
    fn from(result: &ScrapeResult) -> Self {
        Self {
            price: result.price,
            availability: result.availability,
            variant_confirmed: result.variant_confirmed,
            sku_confirmed: result.sku_confirmed,
            timestamp: result.timestamp,
            error: result.error.clone(),
        }
    }
}

/// URL → last persisted reading
///
/// Entries are overwritten in place after a full run; they are only ever
/// removed when a site leaves the external catalog.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct State {
    #[serde(flatten)]
    entries: BTreeMap<String, StateEntry>,
}

impl State {
    pub fn get(&self, url: &str) -> Option<&StateEntry> {
        self.entries.get(url)
    }

    pub fn set(&mut self, url: &str, entry: StateEntry) {
        self.entries.insert(url.to_string(), entry);
    }

    /// Records a result as the latest reading for its URL
    pub fn record(&mut self, result: &ScrapeResult) {
        self.set(&result.url, StateEntry::from(result));
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load-once / write-once store for the state file
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the previous state
    ///
    /// A missing file is a normal first run. An unreadable file is logged
    /// and treated as empty; the next successful run rewrites it.
    pub fn load(&self) -> State {
        if !self.path.exists() {
            return State::default();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!("Cannot parse {}: {}", self.path.display(), e);
                    State::default()
                }
            },
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", self.path.display(), e);
                State::default()
            }
        }
    }

    /// Writes the full state snapshot
    pub fn save(&self, state: &State) -> StorageResult<()> {
        write_json_atomically(&self.path, state)?;
        tracing::info!("State saved to {}", self.path.display());
        Ok(())
    }
}
