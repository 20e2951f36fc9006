//! Decides whether a run creates a new vibe or updates an existing one.

use vibe_core::HubUrl;

use crate::history::HistoryStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionTarget {
    New,
    Update(String),
}

impl VersionTarget {
    #[must_use]
    pub fn did(&self) -> Option<&str> {
        match self {
            Self::New => None,
            Self::Update(did) => Some(did),
        }
    }
}

/// Resolve the upload target for `source` on `hub`.
///
/// Order: `force_new` → explicit DID → history entry → new. Never fails; an
/// unreadable history degrades to [`VersionTarget::New`].
pub fn resolve_version(
    source: &str,
    hub: &HubUrl,
    explicit_did: Option<&str>,
    force_new: bool,
    history: &dyn HistoryStore,
) -> VersionTarget {
    if force_new {
        return VersionTarget::New;
    }
    if let Some(did) = explicit_did.map(str::trim).filter(|d| !d.is_empty()) {
        return VersionTarget::Update(did.to_string());
    }
    match history.lookup(source, hub) {
        Some(entry) => {
            tracing::debug!(did = %entry.did, "found previous publish");
            VersionTarget::Update(entry.did)
        }
        None => VersionTarget::New,
    }
}
