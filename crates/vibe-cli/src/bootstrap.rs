use std::path::PathBuf;

use anyhow::Context;
use vibe_config::VibeConfig;

/// Load `.env` and the layered application config.
pub fn load_config() -> anyhow::Result<VibeConfig> {
    VibeConfig::load_with_dotenv().context("failed to load myvibe configuration")
}

/// Directory holding history, tag cache, and credentials.
pub fn data_dir(config: &VibeConfig) -> anyhow::Result<PathBuf> {
    config
        .general
        .data_dir()
        .context("cannot determine data directory: no home directory; set MYVIBE_GENERAL__DATA_DIR")
}

/// Hub named on the command line, or the configured default.
pub fn hub_url(flag: Option<&str>, config: &VibeConfig) -> anyhow::Result<vibe_core::HubUrl> {
    let raw = flag.unwrap_or(&config.hub.url);
    vibe_core::HubUrl::parse(raw).with_context(|| format!("invalid hub URL '{raw}'"))
}

/// Hub client configured from `config`, with discovery when a component is set.
pub fn hub_client(config: &VibeConfig) -> vibe_hub::HubClient {
    let client = vibe_hub::HubClient::new(config.hub.request_timeout());
    if config.hub.discovery_enabled() {
        client.with_discovery(&config.hub.component_did)
    } else {
        client
    }
}
