//! Hub endpoint configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_url() -> String {
    vibe_core::DEFAULT_HUB_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HubConfig {
    /// Hub used when neither the publish file nor flags name one.
    #[serde(default = "default_url")]
    pub url: String,

    /// DID of the publishing component, used to discover its mount point
    /// when the hub serves it under a sub-path. Empty disables discovery.
    #[serde(default)]
    pub component_did: String,

    /// Timeout for individual non-streaming requests.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            component_did: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl HubConfig {
    /// Whether mount-point discovery is enabled.
    #[must_use]
    pub fn discovery_enabled(&self) -> bool {
        !self.component_did.trim().is_empty()
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = HubConfig::default();
        assert_eq!(config.url, "https://www.myvibe.so");
        assert_eq!(config.request_timeout_secs, 60);
        assert!(!config.discovery_enabled());
    }
}
