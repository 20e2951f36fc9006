use serde::Serialize;
use vibe_auth::{FlowSettings, HubAuthenticator, TokenStore};
use vibe_config::VibeConfig;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::HubArgs;
use crate::output::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthLoginResponse {
    authenticated: bool,
    hub: String,
    credentials_path: String,
}

pub async fn handle(args: &HubArgs, flags: &GlobalFlags, config: &VibeConfig) -> anyhow::Result<i32> {
    let hub = bootstrap::hub_url(args.hub.as_deref(), config)?;
    let store = TokenStore::new(&bootstrap::data_dir(config)?);
    let credentials_path = store.path().display().to_string();

    let client = bootstrap::hub_client(config);
    let authenticator = HubAuthenticator::new(
        store,
        client.http().clone(),
        FlowSettings {
            timeout: config.auth.timeout(),
            poll_interval: config.auth.poll_interval(),
        },
    );
    authenticator.login(&hub).await?;

    output(
        &AuthLoginResponse {
            authenticated: true,
            hub: hub.origin(),
            credentials_path,
        },
        flags.format,
    )?;
    Ok(0)
}
