//! Content-type detection for file sources.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub const ZIP: &str = "application/zip";
pub const ZIP_COMPRESSED: &str = "application/x-zip-compressed";
pub const HTML: &str = "text/html";
const OCTET_STREAM: &str = "application/octet-stream";

/// MIME types the hub accepts as an upload.
pub const ACCEPTED_TYPES: &[&str] = &[ZIP, ZIP_COMPRESSED, HTML];

#[must_use]
pub fn is_accepted(mime: &str) -> bool {
    ACCEPTED_TYPES.contains(&mime)
}

pub trait ContentSniffer: Send + Sync {
    /// Best-guess MIME type of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file has to be read and cannot be.
    fn sniff(&self, path: &Path) -> io::Result<String>;
}

/// Extension lookup via `mime_guess`, then magic bytes for unknown
/// extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MimeSniffer;

impl ContentSniffer for MimeSniffer {
    fn sniff(&self, path: &Path) -> io::Result<String> {
        if let Some(guess) = mime_guess::from_path(path).first()
            && guess.essence_str() != OCTET_STREAM
        {
            return Ok(guess.essence_str().to_string());
        }

        let mut head = Vec::with_capacity(512);
        File::open(path)?.take(512).read_to_end(&mut head)?;
        Ok(sniff_bytes(&head).to_string())
    }
}

fn sniff_bytes(head: &[u8]) -> &'static str {
    if head.starts_with(b"PK\x03\x04") {
        return ZIP;
    }
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start().to_ascii_lowercase();
    if text.starts_with("<!doctype html") || text.starts_with("<html") {
        HTML
    } else {
        OCTET_STREAM
    }
}
