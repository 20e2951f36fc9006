//! Progress events emitted by a publish run.

use std::fmt;

use tokio::sync::mpsc;

/// Capacity of the event channel handed out by
/// [`crate::Publisher::subscribe`].
pub const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authenticating,
    Compressing,
    Uploading,
    Importing,
    Converting,
    Publishing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Authenticating => "Authenticating",
            Self::Compressing => "Compressing directory",
            Self::Uploading => "Uploading",
            Self::Importing => "Importing from URL",
            Self::Converting => "Waiting for conversion",
            Self::Publishing => "Publishing",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishEvent {
    Stage(Stage),
    /// Conversion progress: a stream message or a `Status: X` poll line.
    Progress(String),
    /// A degraded but recoverable condition.
    Warning(String),
    Published { did: String, url: String },
}

/// Sending half of the event channel. Without a subscriber, events are dropped.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    tx: Option<mpsc::Sender<PublishEvent>>,
}

impl EventSink {
    pub(crate) fn channel() -> (Self, mpsc::Receiver<PublishEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        (Self { tx: Some(tx) }, rx)
    }

    pub(crate) async fn emit(&self, event: PublishEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event).await;
        }
    }
}
