//! Shared HTTP response helpers for hub requests.
//!
//! Centralizes status-code checks (429 rate limiting with `Retry-After`
//! parsing, non-success → [`HubError::Api`]) so endpoint methods stay focused
//! on request construction and response mapping.

use serde::de::DeserializeOwned;

use crate::error::HubError;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** → [`HubError::RateLimited`] with `Retry-After`
///   header parsing (falls back to 60 s if absent or unparseable).
/// - **Non-success status** → [`HubError::Api`] with the status code and the
///   hub's `error`/`message` field, or the raw body when it is not JSON.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, HubError> {
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(HubError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(HubError::Api {
            status,
            message: error_message(&body),
        });
    }
    Ok(resp)
}

/// Check the response and decode its JSON body.
pub async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, HubError> {
    let resp = check_response(resp).await?;
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| HubError::Parse(e.to_string()))
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "message"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}
