use serde::Serialize;
use vibe_auth::{TOKEN_ENV_VAR, TokenStore};
use vibe_config::VibeConfig;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::HubArgs;
use crate::output::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthLogoutResponse {
    hub: String,
    cleared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

pub fn handle(args: &HubArgs, flags: &GlobalFlags, config: &VibeConfig) -> anyhow::Result<i32> {
    let hub = bootstrap::hub_url(args.hub.as_deref(), config)?;
    let store = TokenStore::new(&bootstrap::data_dir(config)?);
    let cleared = store.delete(&hub)?;

    let note = std::env::var_os(TOKEN_ENV_VAR)
        .is_some()
        .then(|| format!("{TOKEN_ENV_VAR} is set and still provides a token"));

    output(
        &AuthLogoutResponse {
            hub: hub.origin(),
            cleared,
            note,
        },
        flags.format,
    )?;
    Ok(0)
}
