//! # vibe-publish
//!
//! The publish pipeline.
//!
//! A run inspects the source locally, obtains a token, decides between a new
//! vibe and an update ([`resolver`]), uploads or imports ([`submit`]), waits
//! for conversion when the hub asks for it ([`monitor`]), publishes and builds
//! the public link ([`finalize`]), and records the DID for the next run
//! ([`history`]). Directory sources are compressed by an [`Archiver`] whose
//! archive is released on every exit path.

pub mod archive;
pub mod error;
pub mod events;
pub mod finalize;
pub mod history;
pub mod monitor;
pub mod pipeline;
pub mod resolver;
pub mod sniff;
pub mod submit;

#[cfg(test)]
mod test_support;

pub use archive::{Archive, Archiver, ZipArchiver};
pub use error::{ErrorKind, PublishError};
pub use events::{PublishEvent, Stage};
pub use finalize::Published;
pub use history::{HistoryStore, JsonHistoryStore, MemoryHistoryStore};
pub use monitor::MonitorSettings;
pub use pipeline::{PublishSettings, Publisher};
pub use resolver::{VersionTarget, resolve_version};
pub use sniff::{ContentSniffer, MimeSniffer};
