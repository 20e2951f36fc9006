//! HTTP implementation of [`HubApi`].

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest_eventsource::{Event, EventSource};
use vibe_core::{HubUrl, PublishMetadata};

use crate::api::{ConversionStream, HubApi, HubSession, UploadFile, paths};
use crate::discovery::ApiBaseResolver;
use crate::error::HubError;
use crate::http::read_json;
use crate::types::{
    ActionResponse, ConversionEvent, ConversionStatus, FromUrlRequest, FromUrlResponse,
    PublishAction, TagListResponse, TagType, UploadResponse, VibeInfo,
};

const USER_AGENT: &str = concat!("myvibe/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the hub API.
///
/// Non-streaming requests carry a per-request timeout; the conversion stream
/// does not, since the monitor bounds it with its own deadline.
pub struct HubClient {
    http: reqwest::Client,
    request_timeout: Duration,
    resolver: Option<ApiBaseResolver>,
}

impl HubClient {
    /// Create a client with the given per-request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .connect_timeout(Duration::from_secs(30))
                .build()
                .expect("reqwest client should build"),
            request_timeout,
            resolver: None,
        }
    }

    /// Enable mount-point discovery for the component with `component_did`.
    #[must_use]
    pub fn with_discovery(mut self, component_did: &str) -> Self {
        self.resolver = Some(ApiBaseResolver::new(
            self.http.clone(),
            component_did,
            self.request_timeout,
        ));
        self
    }

    /// The underlying HTTP client, shared with the auth flow.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Fetch the active tags of one type. Tags are served at the hub origin.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] if the request fails or the body is malformed.
    pub async fn fetch_tags(
        &self,
        hub: &HubUrl,
        tag_type: TagType,
    ) -> Result<Vec<serde_json::Value>, HubError> {
        let url = format!("{}/api/tags", hub.origin());
        let resp = self
            .http
            .get(&url)
            .query(&[("type", tag_type.as_str()), ("isActive", "true")])
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.request_timeout)
            .send()
            .await?;
        let list: TagListResponse = read_json(resp).await?;
        Ok(list.data)
    }

    fn authed(&self, builder: reqwest::RequestBuilder, session: &HubSession) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&session.token)
            .timeout(self.request_timeout)
    }
}

#[async_trait]
impl HubApi for HubClient {
    async fn api_base(&self, hub: &HubUrl) -> String {
        match &self.resolver {
            Some(resolver) => resolver.resolve(hub).await,
            None => hub.as_str().to_string(),
        }
    }

    async fn upload(
        &self,
        session: &HubSession,
        file: &UploadFile,
        did: Option<&str>,
    ) -> Result<UploadResponse, HubError> {
        let bytes = tokio::fs::read(&file.path).await.map_err(|source| HubError::Io {
            path: file.path.display().to_string(),
            source,
        })?;
        tracing::debug!(file = %file.file_name, bytes = bytes.len(), mime = %file.mime, "uploading");

        let part = Part::bytes(bytes)
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)?;
        let mut form = Form::new().part("file", part);
        if let Some(did) = did {
            form = form.text("did", did.to_string());
        }

        let resp = self
            .authed(self.http.post(session.endpoint(paths::UPLOAD)), session)
            .multipart(form)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn create_from_url(
        &self,
        session: &HubSession,
        request: &FromUrlRequest,
    ) -> Result<FromUrlResponse, HubError> {
        let resp = self
            .authed(self.http.post(session.endpoint(paths::FROM_URL)), session)
            .json(request)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn conversion_events(
        &self,
        session: &HubSession,
        did: &str,
    ) -> Result<ConversionStream, HubError> {
        let request = self
            .http
            .get(session.endpoint(&paths::convert_stream(did)))
            .bearer_auth(&session.token)
            .header(reqwest::header::ACCEPT, "text/event-stream");
        let source = EventSource::new(request).map_err(|e| HubError::Stream(e.to_string()))?;
        Ok(conversion_stream(source))
    }

    async fn conversion_status(
        &self,
        session: &HubSession,
        did: &str,
    ) -> Result<ConversionStatus, HubError> {
        let resp = self
            .authed(
                self.http.get(session.endpoint(&paths::conversion_status(did))),
                session,
            )
            .send()
            .await?;
        read_json(resp).await
    }

    async fn publish(
        &self,
        session: &HubSession,
        did: &str,
        metadata: &PublishMetadata,
    ) -> Result<ActionResponse, HubError> {
        let resp = self
            .authed(self.http.patch(session.endpoint(&paths::vibe_action(did))), session)
            .json(&PublishAction::new(metadata))
            .send()
            .await?;

        // A refused publish carries its reason in the body.
        if resp.status().is_client_error() && resp.status() != 429 {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Ok(serde_json::from_str::<ActionResponse>(&body).unwrap_or_else(|_| {
                ActionResponse {
                    success: false,
                    error: Some(format!("HTTP {status}: {}", body.trim())),
                }
            }));
        }
        read_json(resp).await
    }

    async fn vibe_info(&self, session: &HubSession, did: &str) -> Result<VibeInfo, HubError> {
        let resp = self
            .authed(self.http.get(session.endpoint(&paths::vibe_info(did))), session)
            .send()
            .await?;
        read_json(resp).await
    }
}

/// A closable server-sent event feed.
trait EventFeed:
    futures::Stream<Item = Result<Event, reqwest_eventsource::Error>> + Unpin + Send + 'static
{
    fn close(&mut self);
}

impl EventFeed for EventSource {
    fn close(&mut self) {
        Self::close(self);
    }
}

/// Adapt an event feed into conversion events.
///
/// The feed is closed after a terminal event or the first error so that
/// `reqwest-eventsource` does not reconnect on its own; falling back is the
/// monitor's decision.
fn conversion_stream<F: EventFeed>(source: F) -> ConversionStream {
    futures::stream::unfold(Some(source), |state| async move {
        let mut source = state?;
        loop {
            match source.next().await {
                None => return None,
                Some(Ok(Event::Open)) => tracing::debug!("conversion stream opened"),
                Some(Ok(Event::Message(msg))) => {
                    let event = ConversionEvent::from_sse(&msg.event, &msg.data);
                    if event.is_terminal() {
                        source.close();
                        return Some((Ok(event), None));
                    }
                    return Some((Ok(event), Some(source)));
                }
                Some(Err(error)) => {
                    source.close();
                    return Some((Err(HubError::Stream(error.to_string())), None));
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::task::{Context, Poll};

    use pretty_assertions::assert_eq;

    type FeedItem = Result<Event, reqwest_eventsource::Error>;

    /// Scripted feed that reports whether it was closed and never yields
    /// again once it has been.
    struct ScriptedFeed {
        items: VecDeque<FeedItem>,
        closed: Arc<AtomicBool>,
    }

    impl ScriptedFeed {
        fn new(items: Vec<FeedItem>) -> (Self, Arc<AtomicBool>) {
            let closed = Arc::new(AtomicBool::new(false));
            let feed = Self {
                items: items.into(),
                closed: closed.clone(),
            };
            (feed, closed)
        }
    }

    impl futures::Stream for ScriptedFeed {
        type Item = FeedItem;

        fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<FeedItem>> {
            assert!(!self.closed.load(Ordering::SeqCst), "polled after close");
            Poll::Ready(self.items.pop_front())
        }
    }

    impl EventFeed for ScriptedFeed {
        fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn message(event: &str, data: &str) -> FeedItem {
        Ok(Event::Message(eventsource_stream::Event {
            event: event.into(),
            data: data.into(),
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn terminal_event_closes_the_feed() {
        let (feed, closed) = ScriptedFeed::new(vec![
            Ok(Event::Open),
            message("progress", r#"{"message":"Bundling"}"#),
            message("completed", "{}"),
            message("progress", r#"{"message":"after close"}"#),
        ]);

        let events: Vec<_> = conversion_stream(feed)
            .map(|item| item.expect("event"))
            .collect()
            .await;

        assert_eq!(
            events,
            vec![
                ConversionEvent::Progress(Some("Bundling".into())),
                ConversionEvent::Completed,
            ]
        );
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn first_error_closes_the_feed() {
        let (feed, closed) = ScriptedFeed::new(vec![
            Err(reqwest_eventsource::Error::StreamEnded),
            message("progress", r#"{"message":"reconnected"}"#),
        ]);

        let items: Vec<_> = conversion_stream(feed).collect().await;

        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], Err(HubError::Stream(msg)) if msg == "Stream ended"));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn exhausted_feed_ends_without_close() {
        let (feed, closed) = ScriptedFeed::new(vec![message("progress", "working")]);

        let items: Vec<_> = conversion_stream(feed).collect().await;

        assert_eq!(items.len(), 1);
        assert!(!closed.load(Ordering::SeqCst));
    }
}
