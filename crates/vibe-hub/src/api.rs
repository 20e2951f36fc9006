//! The hub operations the publish pipeline depends on.
//!
//! [`HubApi`] is the seam between orchestration and transport: the pipeline
//! only talks to this trait, [`crate::HubClient`] implements it over HTTP, and
//! tests substitute scripted fakes.

use std::path::PathBuf;

use async_trait::async_trait;
use futures::stream::BoxStream;
use vibe_core::{HubUrl, PublishMetadata};

use crate::error::HubError;
use crate::types::{
    ActionResponse, ConversionEvent, ConversionStatus, FromUrlRequest, FromUrlResponse,
    UploadResponse, VibeInfo,
};

/// Resolved API base plus the bearer token for one publish run.
#[derive(Debug, Clone)]
pub struct HubSession {
    /// `origin + mount point`, no trailing slash.
    pub api_base: String,
    pub token: String,
}

impl HubSession {
    #[must_use]
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }
}

/// A local file ready to be sent to the upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub path: PathBuf,
    /// Name reported in the multipart part.
    pub file_name: String,
    pub mime: String,
}

/// Conversion events in arrival order. The stream ends after a terminal event
/// or after the first `Err`.
pub type ConversionStream = BoxStream<'static, Result<ConversionEvent, HubError>>;

#[async_trait]
pub trait HubApi: Send + Sync {
    /// Base URL the API is served under. Defaults to the hub URL itself.
    async fn api_base(&self, hub: &HubUrl) -> String {
        hub.as_str().to_string()
    }

    async fn upload(
        &self,
        session: &HubSession,
        file: &UploadFile,
        did: Option<&str>,
    ) -> Result<UploadResponse, HubError>;

    async fn create_from_url(
        &self,
        session: &HubSession,
        request: &FromUrlRequest,
    ) -> Result<FromUrlResponse, HubError>;

    /// Open the live conversion event stream for `did`.
    async fn conversion_events(
        &self,
        session: &HubSession,
        did: &str,
    ) -> Result<ConversionStream, HubError>;

    async fn conversion_status(
        &self,
        session: &HubSession,
        did: &str,
    ) -> Result<ConversionStatus, HubError>;

    async fn publish(
        &self,
        session: &HubSession,
        did: &str,
        metadata: &PublishMetadata,
    ) -> Result<ActionResponse, HubError>;

    async fn vibe_info(&self, session: &HubSession, did: &str) -> Result<VibeInfo, HubError>;
}

/// API paths, relative to [`HubSession::api_base`].
pub mod paths {
    pub const UPLOAD: &str = "/api/uploaded-blocklets/upload";
    pub const FROM_URL: &str = "/api/vibes/from-url";

    #[must_use]
    pub fn convert_stream(did: &str) -> String {
        format!("/api/uploaded-blocklets/{did}/convert/stream")
    }

    #[must_use]
    pub fn conversion_status(did: &str) -> String {
        format!("/api/uploaded-blocklets/{did}/conversion-status")
    }

    #[must_use]
    pub fn vibe_action(did: &str) -> String {
        format!("/api/vibes/{did}/action")
    }

    #[must_use]
    pub fn vibe_info(did: &str) -> String {
        format!("/api/vibes/{did}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_endpoints_join_without_double_slash() {
        let session = HubSession::new("https://hub.example/mw/", "t");
        assert_eq!(
            session.endpoint(&paths::conversion_status("d1")),
            "https://hub.example/mw/api/uploaded-blocklets/d1/conversion-status"
        );
        assert_eq!(
            session.endpoint(paths::UPLOAD),
            "https://hub.example/mw/api/uploaded-blocklets/upload"
        );
    }
}
