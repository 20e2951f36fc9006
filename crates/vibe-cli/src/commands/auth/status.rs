use serde::Serialize;
use vibe_auth::TokenStore;
use vibe_config::VibeConfig;
use vibe_core::HubUrl;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::HubArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthStatusResponse {
    hub: String,
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_source: Option<&'static str>,
    credentials_path: String,
}

pub fn handle(args: &HubArgs, flags: &GlobalFlags, config: &VibeConfig) -> anyhow::Result<i32> {
    let hub = bootstrap::hub_url(args.hub.as_deref(), config)?;
    let store = TokenStore::new(&bootstrap::data_dir(config)?);
    output(&status(&store, &hub), flags.format)?;
    Ok(0)
}

fn status(store: &TokenStore, hub: &HubUrl) -> AuthStatusResponse {
    let source = store.load_with_source(hub).map(|(_, source)| source);
    AuthStatusResponse {
        hub: hub.origin(),
        authenticated: source.is_some(),
        token_source: source.map(vibe_auth::TokenSource::as_str),
        credentials_path: store.path().display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibe_auth::TOKEN_ENV_VAR;

    #[test]
    fn reports_stored_token_and_missing_token() {
        // An env token shadows the file.
        if std::env::var_os(TOKEN_ENV_VAR).is_some() {
            return;
        }
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = TokenStore::new(tmp.path());
        let hub = HubUrl::parse("https://hub.example/app").expect("hub");

        let before = status(&store, &hub);
        assert!(!before.authenticated);
        assert_eq!(before.token_source, None);

        store.store(&hub, "secret").expect("store");
        let after = status(&store, &hub);
        assert!(after.authenticated);
        assert_eq!(after.token_source, Some("file"));
        assert_eq!(after.hub, "https://hub.example");
    }
}
