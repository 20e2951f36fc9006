//! Terminal results.

use serde::Serialize;

/// Terminal result of conversion monitoring. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Completed,
    Failed(String),
    TimedOut,
}

/// Structured result of a publish run, printed as JSON by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PublishOutcome {
    #[must_use]
    pub const fn published(did: String, url: String) -> Self {
        Self {
            success: true,
            did: Some(did),
            url: Some(url),
            error: None,
        }
    }

    #[must_use]
    pub const fn failed(error: String) -> Self {
        Self {
            success: false,
            did: None,
            url: None,
            error: Some(error),
        }
    }
}
