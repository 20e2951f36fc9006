//! Publish history entries.
//!
//! One entry per (source identity, hub). A later successful publish of the
//! same pair overwrites the entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Record of the last successful publish of a source to a hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Absolute source path, or the URL verbatim.
    pub source: String,
    /// Hub URL without trailing slash.
    pub hub: String,
    /// Remote entity identifier.
    pub did: String,
    /// Title used for the last publish (may be empty).
    #[serde(default)]
    pub title: String,
    pub published_at: DateTime<Utc>,
}

/// Storage key for a (source, hub) pair.
///
/// First 16 bytes of SHA-256 over `hub + "\n" + source`, hex encoded.
#[must_use]
pub fn history_key(source: &str, hub: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(hub.trim_end_matches('/').as_bytes());
    hasher.update(b"\n");
    hasher.update(source.as_bytes());
    let digest = hasher.finalize();
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}
