//! Cross-cutting error types for the publisher.
//!
//! Domain-specific errors (`HubError`, `AuthError`, `PublishError`) live in
//! their respective crates. `CoreError` covers input validation and the
//! local persistence helpers every crate shares.

use thiserror::Error;

/// Errors that can be raised by any vibe crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input failed validation (ambiguous source, malformed URL, bad enum value).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Local filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
