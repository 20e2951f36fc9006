//! # vibe-config
//!
//! Layered configuration loading for the myvibe publisher using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`MYVIBE_*` prefix, `__` as separator)
//! 2. Project-level `.myvibe/config.toml`
//! 3. User-level `~/.config/myvibe/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `MYVIBE_HUB__URL` -> `hub.url`, `MYVIBE_MONITOR__TIMEOUT_SECS`
//! -> `monitor.timeout_secs`, etc.
//!
//! The per-run publish file (YAML) is a separate document, see
//! [`publish_file`].

mod auth;
mod error;
mod general;
mod hub;
mod monitor;
pub mod publish_file;

pub use auth::AuthConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use hub::HubConfig;
pub use monitor::MonitorConfig;
pub use publish_file::{load_publish_file, merge_options};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VibeConfig {
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl VibeConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source is malformed, and
    /// [`ConfigError::InvalidValue`] if a loaded value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// A missing `.env` is not an error.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".myvibe/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("MYVIBE_").split("__"))
    }

    /// Reject values that would make the pipeline spin or never time out.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("monitor.poll_interval_secs", self.monitor.poll_interval_secs),
            ("monitor.timeout_secs", self.monitor.timeout_secs),
            ("auth.poll_interval_secs", self.auth.poll_interval_secs),
            ("auth.timeout_secs", self.auth.timeout_secs),
            ("hub.request_timeout_secs", self.hub.request_timeout_secs),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        vibe_core::HubUrl::parse(&self.hub.url).map_err(|e| ConfigError::InvalidValue {
            field: "hub.url".to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("myvibe").join("config.toml"))
    }
}
