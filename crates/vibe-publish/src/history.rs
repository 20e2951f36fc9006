//! Publish history: which DID a (source, hub) pair was last published to.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use vibe_core::fsutil::{read_json, write_json_atomic};
use vibe_core::{CoreError, HistoryEntry, HubUrl, history_key};

pub trait HistoryStore: Send + Sync {
    /// The entry for `source` on `hub`, if one exists and can be read.
    fn lookup(&self, source: &str, hub: &HubUrl) -> Option<HistoryEntry>;

    /// Create or overwrite the entry for the entry's (source, hub).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] if the entry cannot be persisted.
    fn record(&self, entry: &HistoryEntry) -> Result<(), CoreError>;
}

/// One JSON file per (source, hub) under `{data_dir}/history/`.
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    dir: PathBuf,
}

impl JsonHistoryStore {
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join("history"),
        }
    }

    fn path_for(&self, source: &str, hub: &str) -> PathBuf {
        self.dir.join(format!("{}.json", history_key(source, hub)))
    }
}

impl HistoryStore for JsonHistoryStore {
    fn lookup(&self, source: &str, hub: &HubUrl) -> Option<HistoryEntry> {
        let path = self.path_for(source, hub.as_str());
        match read_json::<HistoryEntry>(&path) {
            Ok(entry) => entry.filter(|e| e.source == source && !e.did.is_empty()),
            Err(error) => {
                tracing::warn!(%error, path = %path.display(), "ignoring unreadable history entry");
                None
            }
        }
    }

    fn record(&self, entry: &HistoryEntry) -> Result<(), CoreError> {
        write_json_atomic(&self.path_for(&entry.source, &entry.hub), entry)
    }
}

/// Process-local history, for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<HashMap<String, HistoryEntry>>,
}

impl HistoryStore for MemoryHistoryStore {
    fn lookup(&self, source: &str, hub: &HubUrl) -> Option<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&history_key(source, hub.as_str()))
            .cloned()
    }

    fn record(&self, entry: &HistoryEntry) -> Result<(), CoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(history_key(&entry.source, &entry.hub), entry.clone());
        Ok(())
    }
}
