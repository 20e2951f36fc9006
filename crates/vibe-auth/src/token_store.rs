use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use vibe_core::HubUrl;
use vibe_core::fsutil::{read_json, write_json_atomic};

use crate::error::AuthError;

/// Environment variable that overrides stored credentials for every hub.
pub const TOKEN_ENV_VAR: &str = "MYVIBE_ACCESS_TOKEN";
const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Where a resolved token came from (for status display).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Env,
    File,
}

impl TokenSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::File => "file",
        }
    }
}

/// Per-hub access tokens.
///
/// Priority: `MYVIBE_ACCESS_TOKEN` env → `{data_dir}/credentials.json`
/// (a map from hub origin to token, written with mode 0600).
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CREDENTIALS_FILE_NAME),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the token for `hub`.
    #[must_use]
    pub fn load(&self, hub: &HubUrl) -> Option<String> {
        self.load_with_source(hub).map(|(token, _)| token)
    }

    /// Load the token for `hub` along with the tier it came from.
    #[must_use]
    pub fn load_with_source(&self, hub: &HubUrl) -> Option<(String, TokenSource)> {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR)
            && !token.trim().is_empty()
        {
            return Some((token.trim().to_string(), TokenSource::Env));
        }

        self.read_all()
            .ok()?
            .remove(&hub.origin())
            .filter(|t| !t.trim().is_empty())
            .map(|t| (t, TokenSource::File))
    }

    /// Store a token for `hub`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the credentials file cannot be
    /// read or written.
    pub fn store(&self, hub: &HubUrl, token: &str) -> Result<(), AuthError> {
        let mut all = self.read_all()?;
        all.insert(hub.origin(), token.to_string());
        self.write_all(&all)
    }

    /// Remove the token for `hub`. Returns whether one was stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the credentials file cannot be
    /// read or rewritten.
    pub fn delete(&self, hub: &HubUrl) -> Result<bool, AuthError> {
        let mut all = self.read_all()?;
        let removed = all.remove(&hub.origin()).is_some();
        if removed {
            self.write_all(&all)?;
        }
        Ok(removed)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, AuthError> {
        read_json(&self.path)
            .map(Option::unwrap_or_default)
            .map_err(|e| AuthError::TokenStoreError(format!("read {}: {e}", self.path.display())))
    }

    fn write_all(&self, all: &BTreeMap<String, String>) -> Result<(), AuthError> {
        write_json_atomic(&self.path, all)
            .map_err(|e| AuthError::TokenStoreError(format!("write {}: {e}", self.path.display())))
    }
}
