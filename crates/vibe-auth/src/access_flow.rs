//! Interactive access-key authorization.
//!
//! 1. `POST {origin}/.well-known/service/api/access-key/session` creates a session
//! 2. The browser is opened to the session's approval page
//! 3. `GET .../session/{id}` is polled until the user approves or rejects

use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;
use vibe_core::HubUrl;

use crate::error::AuthError;

pub const WELLKNOWN_SERVICE_PATH: &str = "/.well-known/service";
const SESSION_PATH: &str = "/api/access-key/session";

/// Timing for the approval poll.
#[derive(Debug, Clone, Copy)]
pub struct FlowSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
struct CreatedSession {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionState {
    status: String,
    #[serde(default)]
    access_key: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Poll {
    Pending,
    Approved(String),
}

fn interpret(state: SessionState) -> Result<Poll, AuthError> {
    match state.status.to_ascii_lowercase().as_str() {
        "approved" => state
            .access_key
            .filter(|k| !k.is_empty())
            .map(Poll::Approved)
            .ok_or_else(|| AuthError::SessionFailed("approved session carried no access key".into())),
        "rejected" | "expired" => Err(AuthError::Rejected(state.status)),
        _ => Ok(Poll::Pending),
    }
}

fn session_endpoint(hub: &HubUrl) -> String {
    format!("{}{WELLKNOWN_SERVICE_PATH}{SESSION_PATH}", hub.origin())
}

/// Run the browser approval flow and return the granted access key.
///
/// Transient poll failures are logged and retried until the deadline.
///
/// # Errors
///
/// Returns `AuthError::SessionFailed` if the session cannot be created,
/// `AuthError::Rejected` if the user declines, and `AuthError::TimedOut` if
/// no decision arrives within `settings.timeout`.
pub async fn login(
    http: &reqwest::Client,
    hub: &HubUrl,
    settings: FlowSettings,
) -> Result<String, AuthError> {
    let endpoint = session_endpoint(hub);
    let response = http
        .post(&endpoint)
        .json(&serde_json::json!({ "source": "myvibe-cli" }))
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(AuthError::SessionFailed(format!(
            "session create returned HTTP {}",
            response.status().as_u16()
        )));
    }
    let session: CreatedSession = response
        .json()
        .await
        .map_err(|e| AuthError::SessionFailed(format!("malformed session: {e}")))?;

    eprintln!("Opening browser to: {}", session.url);
    if let Err(error) = open::that(&session.url) {
        eprintln!("Failed to open browser: {error}");
        eprintln!("Open the URL above manually, then return here.");
    }

    let deadline = Instant::now() + settings.timeout;
    let poll_url = format!("{endpoint}/{}", session.id);
    loop {
        tokio::time::sleep(settings.poll_interval).await;
        if Instant::now() >= deadline {
            return Err(AuthError::TimedOut(settings.timeout.as_secs()));
        }

        let state = match http.get(&poll_url).send().await {
            Ok(resp) if resp.status().is_success() => resp.json::<SessionState>().await,
            Ok(resp) => {
                tracing::debug!(status = resp.status().as_u16(), "session poll not ready");
                continue;
            }
            Err(e) => Err(e),
        };
        match state {
            Ok(state) => {
                if let Poll::Approved(key) = interpret(state)? {
                    return Ok(key);
                }
            }
            Err(error) => tracing::warn!(%error, "session poll failed, retrying"),
        }
    }
}
