//! Request and response bodies of the hub API.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use vibe_core::PublishMetadata;

/// Server-side processing status of an uploaded artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    Pending,
    Completed,
    Failed,
    /// Anything else the hub reports (e.g. an intermediate `PROCESSING`).
    Other,
}

impl ProcessingStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            _ => Self::Other,
        }
    }
}

/// `POST /api/uploaded-blocklets/upload` response.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub did: String,
    #[serde(default)]
    pub status: String,
}

impl UploadResponse {
    /// Whether the hub still has to convert the upload.
    #[must_use]
    pub fn needs_conversion(&self) -> bool {
        ProcessingStatus::parse(&self.status) == ProcessingStatus::Pending
    }
}

/// `POST /api/vibes/from-url` body.
#[derive(Debug, Clone, Serialize)]
pub struct FromUrlRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

impl FromUrlRequest {
    #[must_use]
    pub fn new(url: &str, metadata: &PublishMetadata) -> Self {
        Self {
            url: url.to_string(),
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            visibility: metadata.visibility.map(|v| v.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FromUrlResponse {
    pub did: String,
}

/// `GET /api/uploaded-blocklets/{did}/conversion-status` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ConversionStatus {
    #[must_use]
    pub fn phase(&self) -> ProcessingStatus {
        ProcessingStatus::parse(&self.status)
    }
}

/// `PATCH /api/vibes/{did}/action` body for the publish action.
///
/// Empty metadata fields are omitted from the wire form.
#[derive(Debug, Serialize)]
pub struct PublishAction<'a> {
    action: &'static str,
    #[serde(flatten)]
    metadata: &'a PublishMetadata,
}

impl<'a> PublishAction<'a> {
    #[must_use]
    pub const fn new(metadata: &'a PublishMetadata) -> Self {
        Self {
            action: "publish",
            metadata,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/vibes/{did}` response. Only the fields the publisher needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeInfo {
    pub user_did: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// One event of the conversion stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionEvent {
    Progress(Option<String>),
    Completed,
    Failed(String),
}

#[derive(Deserialize)]
struct StreamPayload {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ConversionEvent {
    /// Map an SSE message (event name + data) to a conversion event.
    ///
    /// The payload's `type` wins over the SSE event name. Payloads that are
    /// not JSON objects are treated as free-form progress text.
    #[must_use]
    pub fn from_sse(event_name: &str, data: &str) -> Self {
        let (kind, message) = match serde_json::from_str::<StreamPayload>(data) {
            Ok(payload) => (
                payload.kind.unwrap_or_else(|| event_name.to_string()),
                payload.message,
            ),
            Err(_) => {
                let text = data.trim();
                (
                    event_name.to_string(),
                    (!text.is_empty()).then(|| text.to_string()),
                )
            }
        };

        match kind.as_str() {
            "completed" => Self::Completed,
            "error" => Self::Failed(message.unwrap_or_else(|| "Conversion failed".to_string())),
            _ => Self::Progress(message),
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

/// Tag categories offered by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
    Platform,
    TechStack,
    Model,
    Category,
}

impl TagType {
    pub const ALL: [Self; 4] = [Self::Platform, Self::TechStack, Self::Model, Self::Category];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::TechStack => "tech-stack",
            Self::Model => "model",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags keyed by [`TagType::as_str`]. Tag objects are passed through as the
/// hub returns them.
pub type TagSet = BTreeMap<String, Vec<serde_json::Value>>;

#[derive(Debug, Deserialize)]
pub(crate) struct TagListResponse {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vibe_core::{TagRef, Visibility};

    #[test]
    fn upload_status_is_case_insensitive() {
        let resp: UploadResponse =
            serde_json::from_str(r#"{"did":"d1","status":"pending"}"#).expect("parse");
        assert!(resp.needs_conversion());

        let resp: UploadResponse = serde_json::from_str(r#"{"did":"d1"}"#).expect("parse");
        assert!(!resp.needs_conversion(), "missing status means no conversion");

        let resp: UploadResponse =
            serde_json::from_str(r#"{"did":"d1","status":"QUEUED"}"#).expect("parse");
        assert!(!resp.needs_conversion());
    }

    #[test]
    fn publish_action_omits_empty_fields() {
        let metadata = PublishMetadata {
            title: Some("Demo".into()),
            visibility: Some(Visibility::Private),
            tech_stack_tags: vec![TagRef::Id(3), TagRef::Slug("react".into())],
            ..Default::default()
        };
        let body = serde_json::to_value(PublishAction::new(&metadata)).expect("serialize");
        assert_eq!(
            body,
            serde_json::json!({
                "action": "publish",
                "title": "Demo",
                "visibility": "private",
                "techStackTags": [3, "react"],
            })
        );
    }

    #[test]
    fn from_url_request_carries_only_basic_metadata() {
        let metadata = PublishMetadata {
            title: Some("Site".into()),
            cover_image: Some("https://img.example/c.png".into()),
            visibility: Some(Visibility::Public),
            ..Default::default()
        };
        let body =
            serde_json::to_value(FromUrlRequest::new("https://site.example", &metadata)).expect("ser");
        assert_eq!(
            body,
            serde_json::json!({
                "url": "https://site.example",
                "title": "Site",
                "visibility": "public",
            })
        );
    }

    #[test]
    fn sse_payload_type_wins_over_event_name() {
        assert_eq!(
            ConversionEvent::from_sse("message", r#"{"type":"progress","message":"Bundling"}"#),
            ConversionEvent::Progress(Some("Bundling".into()))
        );
        assert_eq!(
            ConversionEvent::from_sse("message", r#"{"type":"completed","data":{}}"#),
            ConversionEvent::Completed
        );
        assert_eq!(
            ConversionEvent::from_sse("progress", r#"{"type":"error","message":"bad zip"}"#),
            ConversionEvent::Failed("bad zip".into())
        );
    }

    #[test]
    fn sse_event_name_is_used_without_type() {
        assert_eq!(
            ConversionEvent::from_sse("completed", "{}"),
            ConversionEvent::Completed
        );
        assert_eq!(
            ConversionEvent::from_sse("error", "{}"),
            ConversionEvent::Failed("Conversion failed".into())
        );
    }

    #[test]
    fn non_json_payload_is_progress_text() {
        assert_eq!(
            ConversionEvent::from_sse("message", "Installing dependencies\n"),
            ConversionEvent::Progress(Some("Installing dependencies".into()))
        );
        assert!(!ConversionEvent::Progress(None).is_terminal());
    }

    #[test]
    fn vibe_info_reads_camel_case_owner() {
        let info: VibeInfo =
            serde_json::from_str(r#"{"userDid":"u1","title":"x","url":null}"#).expect("parse");
        assert_eq!(info.user_did, "u1");
        assert_eq!(info.url, None);
    }
}
