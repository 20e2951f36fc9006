//! The publish run: inspect → authenticate → resolve → submit → monitor →
//! finalize → record.

use std::sync::Arc;

use tokio::sync::mpsc;
use vibe_auth::TokenProvider;
use vibe_core::{Clock, ConversionOutcome, HistoryEntry, PublishOutcome, PublishRequest, SystemClock};
use vibe_hub::{HubApi, HubSession};

use crate::archive::{Archive, Archiver, ZipArchiver};
use crate::error::PublishError;
use crate::events::{EventSink, PublishEvent, Stage};
use crate::finalize::{Published, finalize};
use crate::history::HistoryStore;
use crate::monitor::{ConversionMonitor, MonitorSettings};
use crate::resolver::resolve_version;
use crate::sniff::{ContentSniffer, MimeSniffer};
use crate::submit::{Submitter, inspect};

#[derive(Debug, Clone, Copy)]
pub struct PublishSettings {
    pub monitor: MonitorSettings,
    pub max_archive_bytes: u64,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            monitor: MonitorSettings::default(),
            max_archive_bytes: 100 * 1024 * 1024,
        }
    }
}

/// Runs publish requests against one hub API.
pub struct Publisher {
    hub: Arc<dyn HubApi>,
    auth: Arc<dyn TokenProvider>,
    history: Arc<dyn HistoryStore>,
    archiver: Arc<dyn Archiver>,
    sniffer: Arc<dyn ContentSniffer>,
    clock: Arc<dyn Clock>,
    settings: PublishSettings,
    events: EventSink,
}

impl Publisher {
    #[must_use]
    pub fn new(
        hub: Arc<dyn HubApi>,
        auth: Arc<dyn TokenProvider>,
        history: Arc<dyn HistoryStore>,
        settings: PublishSettings,
    ) -> Self {
        Self {
            hub,
            auth,
            history,
            archiver: Arc::new(ZipArchiver),
            sniffer: Arc::new(MimeSniffer),
            clock: Arc::new(SystemClock),
            settings,
            events: EventSink::default(),
        }
    }

    #[must_use]
    pub fn with_archiver(mut self, archiver: Arc<dyn Archiver>) -> Self {
        self.archiver = archiver;
        self
    }

    #[must_use]
    pub fn with_sniffer(mut self, sniffer: Arc<dyn ContentSniffer>) -> Self {
        self.sniffer = sniffer;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start receiving [`PublishEvent`]s. Replaces any earlier subscription.
    pub fn subscribe(&mut self) -> mpsc::Receiver<PublishEvent> {
        let (sink, rx) = EventSink::channel();
        self.events = sink;
        rx
    }

    /// Run `request` to completion and report a structured outcome.
    pub async fn publish(&self, request: &PublishRequest) -> PublishOutcome {
        match self.run(request).await {
            Ok(published) => PublishOutcome::published(published.did, published.url),
            Err(error) => {
                tracing::error!(%error, kind = ?error.kind(), "publish failed");
                PublishOutcome::failed(error.to_string())
            }
        }
    }

    /// Run `request`, returning the typed error on failure.
    ///
    /// A temporary archive is released exactly once on every exit path,
    /// including when this future is dropped before completion.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] for the first step that fails. Local checks
    /// run before any remote call.
    pub async fn run(&self, request: &PublishRequest) -> Result<Published, PublishError> {
        let source = inspect(&request.source, self.sniffer.as_ref())?;
        let identity = source.identity();

        self.events.emit(PublishEvent::Stage(Stage::Authenticating)).await;
        let token = self.auth.access_token(&request.hub).await?;
        let session = HubSession::new(self.hub.api_base(&request.hub).await, token);

        let target = resolve_version(
            &identity,
            &request.hub,
            request.target_did.as_deref(),
            request.force_new,
            self.history.as_ref(),
        );
        tracing::debug!(source = %identity, version = ?target, "resolved version");

        let mut archive: Option<Archive> = None;
        let submitter = Submitter {
            hub: self.hub.as_ref(),
            session: &session,
            archiver: self.archiver.as_ref(),
            events: &self.events,
            max_archive_bytes: self.settings.max_archive_bytes,
        };
        let submitted = submitter
            .submit(&source, &target, &request.metadata, &mut archive)
            .await?;

        if submitted.needs_conversion {
            self.events.emit(PublishEvent::Stage(Stage::Converting)).await;
            let monitor = ConversionMonitor::new(
                self.hub.as_ref(),
                &session,
                self.settings.monitor,
                &self.events,
            );
            match monitor.await_terminal(&submitted.did).await? {
                ConversionOutcome::Completed => {}
                ConversionOutcome::Failed(reason) => {
                    return Err(PublishError::ConversionFailed(reason));
                }
                ConversionOutcome::TimedOut => {
                    return Err(PublishError::TimedOut(self.settings.monitor.timeout.as_secs()));
                }
            }
        }

        self.events.emit(PublishEvent::Stage(Stage::Publishing)).await;
        let published = finalize(
            self.hub.as_ref(),
            &session,
            &request.hub,
            &submitted.did,
            &request.metadata,
        )
        .await?;

        self.record_history(&identity, request, &published.did);
        if let Some(archive) = archive.take() {
            archive.release();
        }

        self.events
            .emit(PublishEvent::Published {
                did: published.did.clone(),
                url: published.url.clone(),
            })
            .await;
        Ok(published)
    }

    fn record_history(&self, identity: &str, request: &PublishRequest, did: &str) {
        let entry = HistoryEntry {
            source: identity.to_string(),
            hub: request.hub.as_str().to_string(),
            did: did.to_string(),
            title: request.metadata.title.clone().unwrap_or_default(),
            published_at: self.clock.now(),
        };
        if let Err(error) = self.history.record(&entry) {
            tracing::warn!(%error, did, "failed to record publish history");
        }
    }
}
