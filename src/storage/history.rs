//! Capped per-shop price history

use crate::model::Availability;
use crate::storage::{write_json_atomically, StorageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

/// Maximum records kept per shop; the oldest is evicted on overflow
pub const HISTORY_CAP: usize = 500;

/// One point in a shop's time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub price: Option<f64>,
    pub availability: Availability,
    pub error: Option<String>,
}

/// Shop name → chronological record ring
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct History {
    #[serde(flatten)]
    shops: BTreeMap<String, VecDeque<HistoryRecord>>,
}

impl History {
    /// Appends a record, evicting the oldest entry past [`HISTORY_CAP`]
    pub fn append(&mut self, shop: &str, record: HistoryRecord) {
        let records = self.shops.entry(shop.to_string()).or_default();
        records.push_back(record);
        while records.len() > HISTORY_CAP {
            records.pop_front();
        }
    }

    pub fn records(&self, shop: &str) -> Option<&VecDeque<HistoryRecord>> {
        self.shops.get(shop)
    }

    pub fn shop_count(&self) -> usize {
        self.shops.len()
    }
}

/// Load-once / write-once store for the history file
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Loads history, treating a missing or unreadable file as empty
    pub fn load(&self) -> History {
        if !self.path.exists() {
            return History::default();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Cannot parse {}: {}", self.path.display(), e);
                History::default()
            }),
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", self.path.display(), e);
                History::default()
            }
        }
    }

    /// Writes the full history snapshot
    pub fn save(&self, history: &History) -> StorageResult<()> {
        write_json_atomically(&self.path, history)?;
        tracing::info!("History saved to {}", self.path.display());
        Ok(())
    }
}
