use std::path::PathBuf;

use thiserror::Error;
use vibe_auth::AuthError;
use vibe_core::CoreError;
use vibe_hub::HubError;

/// Coarse failure category of a publish run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or ambiguous input; no remote call was made.
    Validation,
    /// A local file or directory is missing.
    NotFound,
    UnsupportedType,
    /// Network, authentication, or local I/O failure.
    Transport,
    /// The hub explicitly reported failure.
    ServerRejection,
    Timeout,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{0}")]
    Validation(String),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Unsupported file type: {mime} ({}); expected a ZIP archive or HTML file", path.display())]
    UnsupportedContentType { path: PathBuf, mime: String },

    #[error("archive is {size} bytes, larger than the {limit} byte limit")]
    ArchiveTooLarge { size: u64, limit: u64 },

    #[error("failed to create archive: {0}")]
    Archive(String),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("{operation} failed: {source}")]
    Hub {
        operation: &'static str,
        #[source]
        source: HubError,
    },

    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    #[error("conversion monitoring failed: stream: {stream}; polling: {poll}")]
    MonitorFailed { stream: String, poll: HubError },

    #[error("conversion did not finish within {0}s")]
    TimedOut(u64),

    #[error("{0}")]
    PublishActionFailed(String),

    #[error("cancelled")]
    Cancelled,
}

impl PublishError {
    pub(crate) const fn hub(operation: &'static str, source: HubError) -> Self {
        Self::Hub { operation, source }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::NotADirectory(_) | Self::ArchiveTooLarge { .. } => {
                ErrorKind::Validation
            }
            Self::DirectoryNotFound(_) | Self::FileNotFound(_) => ErrorKind::NotFound,
            Self::UnsupportedContentType { .. } => ErrorKind::UnsupportedType,
            Self::Hub {
                source: HubError::Api { .. },
                ..
            }
            | Self::ConversionFailed(_)
            | Self::PublishActionFailed(_) => ErrorKind::ServerRejection,
            Self::Archive(_) | Self::Auth(_) | Self::Hub { .. } | Self::MonitorFailed { .. } => {
                ErrorKind::Transport
            }
            Self::TimedOut(_) => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<CoreError> for PublishError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::Validation(msg),
            other => Self::Archive(other.to_string()),
        }
    }
}
