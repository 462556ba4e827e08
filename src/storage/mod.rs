//! Flat-file persistence for run state and price history
//!
//! Both files are plain JSON: the state file maps URL to the last persisted
//! reading, the history file maps shop name to a capped time series. Each
//! is loaded once at run start and rewritten once at run end; nothing is
//! written incrementally, so a crash mid-run loses that run's updates but
//! leaves the previous snapshot untouched.

mod history;
mod state;

pub use history::{History, HistoryRecord, HistoryStore, HISTORY_CAP};
pub use state::{State, StateEntry, StateStore};

use thiserror::Error;

/// Errors that can occur while persisting run data
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

pub(crate) fn write_json_atomically<T: serde::Serialize>(
    path: &std::path::Path,
    value: &T,
) -> StorageResult<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    // Write a sibling temp file and rename; the previous snapshot stays
    // intact until the new one is complete.
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, serialized)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
