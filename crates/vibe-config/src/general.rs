//! General application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const fn default_max_archive_mb() -> u64 {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Root for history, tag cache, and credentials. Empty means `~/.myvibe`.
    #[serde(default)]
    pub data_dir: String,

    /// Upper bound on a compressed directory archive, in MiB.
    #[serde(default = "default_max_archive_mb")]
    pub max_archive_mb: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            max_archive_mb: default_max_archive_mb(),
        }
    }
}

impl GeneralConfig {
    /// Resolve the data directory. `None` only if no home directory exists
    /// and none was configured.
    #[must_use]
    pub fn data_dir(&self) -> Option<PathBuf> {
        if self.data_dir.trim().is_empty() {
            dirs::home_dir().map(|h| h.join(".myvibe"))
        } else {
            Some(PathBuf::from(self.data_dir.trim()))
        }
    }

    #[must_use]
    pub const fn max_archive_bytes(&self) -> u64 {
        self.max_archive_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert!(config.data_dir.is_empty());
        assert_eq!(config.max_archive_bytes(), 100 * 1024 * 1024);
    }

    #[test]
    fn explicit_data_dir_wins() {
        let config = GeneralConfig {
            data_dir: "/tmp/vibe".into(),
            ..Default::default()
        };
        assert_eq!(config.data_dir(), Some(PathBuf::from("/tmp/vibe")));
    }
}
