//! Hub client error types.

use thiserror::Error;

/// Errors that can occur when talking to the hub.
#[derive(Debug, Error)]
pub enum HubError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The hub returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the hub.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// The hub returned a 429 Too Many Requests response.
    #[error("rate limited; retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Failed to parse a hub response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The conversion event stream could not be opened or broke mid-way.
    #[error("event stream error: {0}")]
    Stream(String),

    /// Reading a local file for upload failed.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
