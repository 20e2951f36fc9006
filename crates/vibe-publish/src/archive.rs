//! Directory compression for upload.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::PublishError;

/// Entries never included in an upload archive.
pub const EXCLUDED_NAMES: &[&str] = &[".git", "node_modules", ".DS_Store"];

type Release = Box<dyn FnOnce() + Send>;

/// A temporary archive on disk.
///
/// The release hook runs exactly once: on [`Archive::release`] or, failing
/// that, when the archive is dropped (including when the owning future is
/// cancelled).
pub struct Archive {
    path: PathBuf,
    release: Option<Release>,
}

impl Archive {
    pub fn new(path: PathBuf, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            path,
            release: Some(Box::new(release)),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Archive {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("released", &self.release.is_none())
            .finish()
    }
}

pub trait Archiver: Send + Sync {
    /// Compress `dir` into a single archive file.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Archive`] if the directory cannot be read or
    /// the archive cannot be written.
    fn archive(&self, dir: &Path) -> Result<Archive, PublishError>;
}

/// Deflate-compressed ZIP in a private temp directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn archive(&self, dir: &Path) -> Result<Archive, PublishError> {
        let staging = tempfile::Builder::new()
            .prefix("myvibe-")
            .tempdir()
            .map_err(|e| PublishError::Archive(format!("temp dir: {e}")))?;
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("site");
        let path = staging.path().join(format!("{name}.zip"));

        let entries = write_zip(dir, &path)
            .map_err(|e| PublishError::Archive(format!("{}: {e}", dir.display())))?;
        tracing::debug!(dir = %dir.display(), entries, archive = %path.display(), "compressed directory");

        Ok(Archive::new(path, move || {
            if let Err(error) = staging.close() {
                tracing::warn!(%error, "failed to remove temporary archive");
            }
        }))
    }
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|n| EXCLUDED_NAMES.contains(&n))
}

fn write_zip(dir: &Path, target: &Path) -> io::Result<usize> {
    let mut writer = ZipWriter::new(File::create(target)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut count = 0;

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded(e))
    {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(io::Error::other)?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        writer.start_file(name, options).map_err(io::Error::other)?;
        io::copy(&mut File::open(entry.path())?, &mut writer)?;
        count += 1;
    }

    writer.finish().map_err(io::Error::other)?;
    Ok(count)
}
