//! The publish action and public link construction.

use vibe_core::{HubUrl, PublishMetadata};
use vibe_hub::{HubApi, HubSession};

use crate::error::PublishError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub did: String,
    pub user_did: String,
    /// `{hub}/{userDid}/{did}`.
    pub url: String,
}

/// Publish `did` with `metadata`, then build its public link from the owner.
///
/// # Errors
///
/// Returns [`PublishError::PublishActionFailed`] when the hub reports the
/// action unsuccessful, and [`PublishError::Hub`] for transport failures.
pub(crate) async fn finalize(
    hub_api: &dyn HubApi,
    session: &HubSession,
    hub: &HubUrl,
    did: &str,
    metadata: &PublishMetadata,
) -> Result<Published, PublishError> {
    let action = hub_api
        .publish(session, did, metadata)
        .await
        .map_err(|e| PublishError::hub("publish action", e))?;
    if !action.success {
        return Err(PublishError::PublishActionFailed(
            action
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "Publish action failed".to_string()),
        ));
    }

    let info = hub_api
        .vibe_info(session, did)
        .await
        .map_err(|e| PublishError::hub("vibe lookup", e))?;
    let url = hub.link(&[&info.user_did, did]);
    tracing::info!(did, url = %url, "published");

    Ok(Published {
        did: did.to_string(),
        user_did: info.user_did,
        url,
    })
}
