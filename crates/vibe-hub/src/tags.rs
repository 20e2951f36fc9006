//! Hub tag catalog with a per-hub disk cache.
//!
//! Tags change rarely, so a fetched set is kept in
//! `{cache_dir}/tags-{hash}.json` for seven days. An expired cache still beats
//! nothing when the hub is unreachable.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use vibe_core::fsutil::{read_json, write_json_atomic};
use vibe_core::{Clock, HubUrl, SystemClock};

use crate::client::HubClient;
use crate::error::HubError;
use crate::types::{TagSet, TagType};

pub const TAG_CACHE_DAYS: i64 = 7;

#[async_trait]
pub trait TagFetcher: Send + Sync {
    async fn fetch_tags(
        &self,
        hub: &HubUrl,
        tag_type: TagType,
    ) -> Result<Vec<serde_json::Value>, HubError>;
}

#[async_trait]
impl TagFetcher for HubClient {
    async fn fetch_tags(
        &self,
        hub: &HubUrl,
        tag_type: TagType,
    ) -> Result<Vec<serde_json::Value>, HubError> {
        Self::fetch_tags(self, hub, tag_type).await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedTags {
    hub: String,
    fetched_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    tags: TagSet,
}

/// Result of a tag lookup, as printed by `myvibe tags`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagsReport {
    pub success: bool,
    pub from_cache: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub expired: bool,
    pub hub: String,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub tags: TagSet,
}

impl TagsReport {
    fn from_cache(cache: CachedTags, expired: bool) -> Self {
        Self {
            success: true,
            from_cache: true,
            expired,
            hub: cache.hub,
            fetched_at: cache.fetched_at,
            expires_at: cache.expires_at,
            tags: cache.tags,
        }
    }
}

pub struct TagCatalog<F, C = SystemClock> {
    fetcher: F,
    cache_dir: PathBuf,
    clock: C,
}

impl<F: TagFetcher> TagCatalog<F, SystemClock> {
    #[must_use]
    pub fn new(fetcher: F, cache_dir: &Path) -> Self {
        Self::with_clock(fetcher, cache_dir, SystemClock)
    }
}

impl<F: TagFetcher, C: Clock> TagCatalog<F, C> {
    #[must_use]
    pub fn with_clock(fetcher: F, cache_dir: &Path, clock: C) -> Self {
        Self {
            fetcher,
            cache_dir: cache_dir.to_path_buf(),
            clock,
        }
    }

    /// Cache file for `hub`: `tags-` plus the first 8 hex digits of its
    /// SHA-256.
    #[must_use]
    pub fn cache_path(&self, hub: &HubUrl) -> PathBuf {
        let digest = Sha256::digest(hub.as_str().as_bytes());
        let hash: String = digest[..4].iter().map(|b| format!("{b:02x}")).collect();
        self.cache_dir.join(format!("tags-{hash}.json"))
    }

    /// Return the tags for `hub`, from cache when fresh unless `refresh`.
    ///
    /// A tag type that fails to load is reported as an empty list. Only when
    /// every type fails is the fetch considered failed, in which case any
    /// cached set is returned marked as expired.
    ///
    /// # Errors
    ///
    /// Returns the last fetch error when nothing could be fetched and no cache
    /// exists.
    pub async fn get(&self, hub: &HubUrl, refresh: bool) -> Result<TagsReport, HubError> {
        let path = self.cache_path(hub);
        let cached = self.load(&path);

        if !refresh
            && let Some(cache) = cached.as_ref().filter(|c| self.clock.now() < c.expires_at)
        {
            tracing::debug!(expires_at = %cache.expires_at, "using cached tags");
            return Ok(TagsReport::from_cache(cache.clone(), false));
        }

        match self.fetch_all(hub).await {
            Ok(tags) => {
                let fetched_at = self.clock.now();
                let fresh = CachedTags {
                    hub: hub.as_str().to_string(),
                    fetched_at,
                    expires_at: fetched_at + Duration::days(TAG_CACHE_DAYS),
                    tags,
                };
                if let Err(error) = write_json_atomic(&path, &fresh) {
                    tracing::warn!(%error, path = %path.display(), "failed to write tag cache");
                }
                Ok(TagsReport {
                    from_cache: false,
                    ..TagsReport::from_cache(fresh, false)
                })
            }
            Err(error) => match cached {
                Some(cache) => {
                    tracing::warn!(%error, "failed to fetch tags, using expired cache");
                    Ok(TagsReport::from_cache(cache, true))
                }
                None => Err(error),
            },
        }
    }

    async fn fetch_all(&self, hub: &HubUrl) -> Result<TagSet, HubError> {
        let mut tags = TagSet::new();
        let mut failures = 0;
        let mut last_error = None;
        for tag_type in TagType::ALL {
            match self.fetcher.fetch_tags(hub, tag_type).await {
                Ok(list) => {
                    tags.insert(tag_type.as_str().to_string(), list);
                }
                Err(error) => {
                    tracing::warn!(%tag_type, %error, "failed to fetch tags");
                    tags.insert(tag_type.as_str().to_string(), Vec::new());
                    failures += 1;
                    last_error = Some(error);
                }
            }
        }
        match last_error {
            Some(error) if failures == TagType::ALL.len() => Err(error),
            _ => Ok(tags),
        }
    }

    fn load(&self, path: &Path) -> Option<CachedTags> {
        match read_json(path) {
            Ok(cache) => cache,
            Err(error) => {
                tracing::warn!(%error, path = %path.display(), "ignoring unreadable tag cache");
                None
            }
        }
    }
}
