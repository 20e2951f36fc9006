//! Waits for server-side conversion to reach a terminal status.
//!
//! The monitor starts on the live event stream and falls back to status
//! polling once if the stream cannot be opened or breaks before a terminal
//! event. A reported `error` event is terminal and does not trigger the
//! fallback. Polling never replays progress the stream already delivered.

use std::time::Duration;

use futures::StreamExt;
use vibe_core::ConversionOutcome;
use vibe_hub::{ConversionEvent, HubApi, HubError, HubSession, ProcessingStatus};

use crate::error::PublishError;
use crate::events::{EventSink, PublishEvent};

pub const STREAM_FALLBACK_WARNING: &str = "SSE connection failed, using polling...";

#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    /// Budget for the whole wait, stream and polling together.
    pub timeout: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MonitorState {
    Streaming,
    Polling { stream_error: String },
}

enum StreamEnd {
    Terminal(ConversionOutcome),
    Broken(String),
}

pub(crate) struct ConversionMonitor<'a> {
    hub: &'a dyn HubApi,
    session: &'a HubSession,
    settings: MonitorSettings,
    events: &'a EventSink,
}

impl<'a> ConversionMonitor<'a> {
    pub(crate) const fn new(
        hub: &'a dyn HubApi,
        session: &'a HubSession,
        settings: MonitorSettings,
        events: &'a EventSink,
    ) -> Self {
        Self {
            hub,
            session,
            settings,
            events,
        }
    }

    /// Block until `did` completes, fails, or the timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MonitorFailed`] when the stream failed and the
    /// polling fallback failed as well.
    pub(crate) async fn await_terminal(&self, did: &str) -> Result<ConversionOutcome, PublishError> {
        if let Ok(result) = tokio::time::timeout(self.settings.timeout, self.run(did)).await {
            result
        } else {
            tracing::warn!(did, timeout_secs = self.settings.timeout.as_secs(), "conversion timed out");
            Ok(ConversionOutcome::TimedOut)
        }
    }

    async fn run(&self, did: &str) -> Result<ConversionOutcome, PublishError> {
        let mut state = MonitorState::Streaming;
        loop {
            state = match state {
                MonitorState::Streaming => match self.stream(did).await {
                    StreamEnd::Terminal(outcome) => return Ok(outcome),
                    StreamEnd::Broken(stream_error) => {
                        tracing::warn!(did, error = %stream_error, "conversion stream failed, polling");
                        self.events
                            .emit(PublishEvent::Warning(STREAM_FALLBACK_WARNING.to_string()))
                            .await;
                        MonitorState::Polling { stream_error }
                    }
                },
                MonitorState::Polling { stream_error } => {
                    return self
                        .poll(did)
                        .await
                        .map_err(|poll| PublishError::MonitorFailed {
                            stream: stream_error,
                            poll,
                        });
                }
            };
        }
    }

    async fn stream(&self, did: &str) -> StreamEnd {
        let mut events = match self.hub.conversion_events(self.session, did).await {
            Ok(events) => events,
            Err(error) => return StreamEnd::Broken(error.to_string()),
        };

        while let Some(item) = events.next().await {
            match item {
                Ok(ConversionEvent::Progress(Some(message))) => {
                    self.events.emit(PublishEvent::Progress(message)).await;
                }
                Ok(ConversionEvent::Progress(None)) => {}
                Ok(ConversionEvent::Completed) => {
                    return StreamEnd::Terminal(ConversionOutcome::Completed);
                }
                Ok(ConversionEvent::Failed(reason)) => {
                    return StreamEnd::Terminal(ConversionOutcome::Failed(reason));
                }
                Err(error) => return StreamEnd::Broken(error.to_string()),
            }
        }
        StreamEnd::Broken("stream ended before a terminal event".to_string())
    }

    async fn poll(&self, did: &str) -> Result<ConversionOutcome, HubError> {
        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let status = self.hub.conversion_status(self.session, did).await?;
            match status.phase() {
                ProcessingStatus::Completed => return Ok(ConversionOutcome::Completed),
                ProcessingStatus::Failed => {
                    return Ok(ConversionOutcome::Failed(
                        status
                            .message
                            .unwrap_or_else(|| "Conversion failed".to_string()),
                    ));
                }
                ProcessingStatus::Pending | ProcessingStatus::Other => {
                    self.events
                        .emit(PublishEvent::Progress(format!("Status: {}", status.status)))
                        .await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeHub, StreamScript};

    fn settings() -> MonitorSettings {
        MonitorSettings {
            poll_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(60),
        }
    }

    async fn watch(hub: &FakeHub) -> (Result<ConversionOutcome, PublishError>, Vec<PublishEvent>) {
        let session = HubSession::new("https://hub.example", "token");
        let (sink, mut rx) = EventSink::channel();
        let outcome = ConversionMonitor::new(hub, &session, settings(), &sink)
            .await_terminal("d1")
            .await;
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        (outcome, events)
    }

    #[tokio::test]
    async fn stream_progress_is_forwarded_in_order() {
        let hub = FakeHub::pending().with_stream(StreamScript::Items(vec![
            Ok(ConversionEvent::Progress(Some("one".into()))),
            Ok(ConversionEvent::Progress(None)),
            Ok(ConversionEvent::Progress(Some("two".into()))),
            Ok(ConversionEvent::Completed),
            Ok(ConversionEvent::Progress(Some("late".into()))),
        ]));

        let (outcome, events) = watch(&hub).await;
        assert_eq!(outcome.expect("outcome"), ConversionOutcome::Completed);
        assert_eq!(
            events,
            vec![
                PublishEvent::Progress("one".into()),
                PublishEvent::Progress("two".into()),
            ]
        );
        assert_eq!(hub.count("poll"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refused_stream_polls_until_completed() {
        let hub = FakeHub::pending()
            .with_stream(StreamScript::Refused)
            .with_polls(&["PENDING", "PROCESSING", "COMPLETED"]);

        let (outcome, events) = watch(&hub).await;
        assert_eq!(outcome.expect("outcome"), ConversionOutcome::Completed);
        assert_eq!(
            events,
            vec![
                PublishEvent::Warning(STREAM_FALLBACK_WARNING.into()),
                PublishEvent::Progress("Status: PENDING".into()),
                PublishEvent::Progress("Status: PROCESSING".into()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn endless_polling_times_out() {
        let hub = FakeHub::pending().with_stream(StreamScript::Refused);

        let (outcome, events) = watch(&hub).await;
        assert_eq!(outcome.expect("outcome"), ConversionOutcome::TimedOut);
        // One immediate poll plus one every 3s within the 60s budget.
        assert!(hub.count("poll") >= 20);
        assert!(events.len() > 1);
    }
}
