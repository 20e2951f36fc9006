//! Hub endpoint normalization.

use std::fmt;

use url::Url;

use crate::errors::CoreError;

/// A validated hub base URL.
///
/// The string form never carries a trailing slash, so it can be used both as
/// a history key and as the prefix for public links.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HubUrl {
    normalized: String,
    url: Url,
}

impl HubUrl {
    /// Parse and normalize a hub URL. Only `http` and `https` are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for unparseable URLs, other schemes,
    /// or URLs without a host.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim().trim_end_matches('/');
        let url = Url::parse(trimmed)
            .map_err(|e| CoreError::Validation(format!("invalid hub URL '{input}': {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::Validation(format!(
                "invalid hub URL '{input}': scheme must be http or https"
            )));
        }
        if url.host_str().is_none() {
            return Err(CoreError::Validation(format!(
                "invalid hub URL '{input}': missing host"
            )));
        }

        Ok(Self {
            normalized: trimmed.to_string(),
            url,
        })
    }

    /// The hub URL without a trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// `scheme://host[:port]` of the hub.
    #[must_use]
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// Append path segments to the hub URL: `{hub}/{a}/{b}`.
    #[must_use]
    pub fn link(&self, segments: &[&str]) -> String {
        let mut out = self.normalized.clone();
        for segment in segments {
            out.push('/');
            out.push_str(segment.trim_matches('/'));
        }
        out
    }
}

impl fmt::Display for HubUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}
