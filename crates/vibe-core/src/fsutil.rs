//! JSON persistence with replace-on-write semantics.
//!
//! Writers stage content in a sibling temp file and rename it over the
//! target, so concurrent readers see either the old or the new document.
//! Staged files are created with mode 0600 on Unix.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::CoreError;

/// Serialize `value` as pretty JSON and atomically replace `path`.
///
/// # Errors
///
/// Returns [`CoreError::Io`] if the parent directory cannot be created or the
/// rename fails, and [`CoreError::Json`] if serialization fails.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    serde_json::to_writer_pretty(&mut staged, value)?;
    staged.write_all(b"\n")?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| CoreError::Io(e.error))?;
    Ok(())
}

/// Read a JSON document. A missing file is `Ok(None)`.
///
/// # Errors
///
/// Returns [`CoreError::Io`] for unreadable files and [`CoreError::Json`]
/// for malformed content.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CoreError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
