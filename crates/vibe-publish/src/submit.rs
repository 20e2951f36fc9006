//! Local source inspection and the upload/import call.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use vibe_core::{PublishMetadata, Source};
use vibe_hub::{FromUrlRequest, HubApi, HubSession, UploadFile};

use crate::archive::{Archive, Archiver};
use crate::error::PublishError;
use crate::events::{EventSink, PublishEvent, Stage};
use crate::resolver::VersionTarget;
use crate::sniff::{self, ContentSniffer};

/// A source that passed local checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspected {
    File { path: PathBuf, mime: String },
    Dir(PathBuf),
    Url(String),
}

impl Inspected {
    /// Identity used for history: the absolute path, or the URL verbatim.
    #[must_use]
    pub fn identity(&self) -> String {
        match self {
            Self::File { path, .. } | Self::Dir(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
        }
    }
}

/// Absolute, lexically normalized path: `.` dropped, `..` folded into its
/// parent, no trailing separator.
fn absolute(path: &Path) -> Result<PathBuf, PublishError> {
    let path = std::path::absolute(path)
        .map_err(|e| PublishError::Validation(format!("invalid path {}: {e}", path.display())))?;
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Verify a source without touching the network.
///
/// # Errors
///
/// Returns [`PublishError::DirectoryNotFound`], [`PublishError::NotADirectory`],
/// [`PublishError::FileNotFound`], or [`PublishError::UnsupportedContentType`].
pub fn inspect(source: &Source, sniffer: &dyn ContentSniffer) -> Result<Inspected, PublishError> {
    match source {
        Source::Url(url) => Ok(Inspected::Url(url.clone())),
        Source::Dir(path) => {
            let path = absolute(path)?;
            match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => Ok(Inspected::Dir(path)),
                Ok(_) => Err(PublishError::NotADirectory(path)),
                Err(_) => Err(PublishError::DirectoryNotFound(path)),
            }
        }
        Source::File(path) => {
            let path = absolute(path)?;
            match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => {
                    return Err(PublishError::Validation(format!(
                        "{} is a directory; use --dir",
                        path.display()
                    )));
                }
                Ok(_) => {}
                Err(_) => return Err(PublishError::FileNotFound(path)),
            }
            let mime = sniffer.sniff(&path).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => PublishError::FileNotFound(path.clone()),
                _ => PublishError::Validation(format!("cannot read {}: {e}", path.display())),
            })?;
            if !sniff::is_accepted(&mime) {
                return Err(PublishError::UnsupportedContentType { path, mime });
            }
            Ok(Inspected::File { path, mime })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub did: String,
    pub needs_conversion: bool,
}

pub(crate) struct Submitter<'a> {
    pub hub: &'a dyn HubApi,
    pub session: &'a HubSession,
    pub archiver: &'a dyn Archiver,
    pub events: &'a EventSink,
    pub max_archive_bytes: u64,
}

impl Submitter<'_> {
    /// Upload or import the source.
    ///
    /// A directory archive is parked in `archive` so the caller owns its
    /// release, whatever happens next.
    pub(crate) async fn submit(
        &self,
        source: &Inspected,
        target: &VersionTarget,
        metadata: &PublishMetadata,
        archive: &mut Option<Archive>,
    ) -> Result<Submitted, PublishError> {
        let upload = match source {
            Inspected::Url(url) => {
                self.events.emit(PublishEvent::Stage(Stage::Importing)).await;
                let created = self
                    .hub
                    .create_from_url(self.session, &FromUrlRequest::new(url, metadata))
                    .await
                    .map_err(|e| PublishError::hub("URL import", e))?;
                return Ok(Submitted {
                    did: created.did,
                    needs_conversion: false,
                });
            }
            Inspected::File { path, mime } => UploadFile {
                path: path.clone(),
                file_name: file_name(path, ""),
                mime: mime.clone(),
            },
            Inspected::Dir(dir) => {
                self.events.emit(PublishEvent::Stage(Stage::Compressing)).await;
                let compressed = archive.insert(self.archiver.archive(dir)?);
                let size = fs::metadata(compressed.path())
                    .map_err(|e| PublishError::Archive(e.to_string()))?
                    .len();
                if size > self.max_archive_bytes {
                    return Err(PublishError::ArchiveTooLarge {
                        size,
                        limit: self.max_archive_bytes,
                    });
                }
                UploadFile {
                    path: compressed.path().to_path_buf(),
                    file_name: file_name(dir, ".zip"),
                    mime: sniff::ZIP.to_string(),
                }
            }
        };

        self.events.emit(PublishEvent::Stage(Stage::Uploading)).await;
        let response = self
            .hub
            .upload(self.session, &upload, target.did())
            .await
            .map_err(|e| PublishError::hub("upload", e))?;
        tracing::info!(did = %response.did, status = %response.status, "uploaded");

        Ok(Submitted {
            needs_conversion: response.needs_conversion(),
            did: response.did,
        })
    }
}

fn file_name(path: &Path, suffix: &str) -> String {
    let stem = path
        .file_name()
        .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
    format!("{stem}{suffix}")
}
