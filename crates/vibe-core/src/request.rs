//! Publish intent: raw options as merged from config and flags, and the
//! validated request the pipeline consumes.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::hub::HubUrl;

/// Who can see a published item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(CoreError::Validation(format!(
                "invalid visibility '{other}': expected public or private"
            ))),
        }
    }
}

/// A tag reference as accepted by the hub: numeric id or slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagRef {
    Id(u64),
    Slug(String),
}

/// Optional descriptive fields sent with the publish action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_repo: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platform_tags: Vec<TagRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tech_stack_tags: Vec<TagRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_tags: Vec<TagRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub model_tags: Vec<TagRef>,
}

impl PublishMetadata {
    /// Field-wise override: every field set in `other` replaces ours.
    #[must_use]
    pub fn overridden_by(self, other: Self) -> Self {
        fn pick_vec(base: Vec<TagRef>, over: Vec<TagRef>) -> Vec<TagRef> {
            if over.is_empty() { base } else { over }
        }

        Self {
            title: other.title.or(self.title),
            description: other.description.or(self.description),
            visibility: other.visibility.or(self.visibility),
            cover_image: other.cover_image.or(self.cover_image),
            github_repo: other.github_repo.or(self.github_repo),
            platform_tags: pick_vec(self.platform_tags, other.platform_tags),
            tech_stack_tags: pick_vec(self.tech_stack_tags, other.tech_stack_tags),
            category_tags: pick_vec(self.category_tags, other.category_tags),
            model_tags: pick_vec(self.model_tags, other.model_tags),
        }
    }

    /// Drop blank strings so they are omitted from outgoing payloads.
    fn normalized(self) -> Self {
        Self {
            title: non_blank(self.title),
            description: non_blank(self.description),
            cover_image: non_blank(self.cover_image),
            github_repo: non_blank(self.github_repo),
            ..self
        }
    }
}

/// Unvalidated publish intent, merged from the publish config file and flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOptions {
    pub file: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub url: Option<String>,
    pub hub: Option<String>,
    pub metadata: PublishMetadata,
    /// Explicit target entity for a version update.
    pub did: Option<String>,
    /// Ignore history and explicit target; always create a new entity.
    pub force_new: bool,
    /// Publish config file the options were loaded from, removed after success.
    pub config_path: Option<PathBuf>,
}

/// Which kind of input a run publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Dir,
    Url,
}

/// Exactly one publish source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Dir(PathBuf),
    Url(String),
}

impl Source {
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::File(_) => SourceKind::File,
            Self::Dir(_) => SourceKind::Dir,
            Self::Url(_) => SourceKind::Url,
        }
    }
}

/// Validated publish intent. Holding one guarantees exactly one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub source: Source,
    pub hub: HubUrl,
    pub metadata: PublishMetadata,
    pub target_did: Option<String>,
    pub force_new: bool,
    pub config_path: Option<PathBuf>,
}

impl PublishRequest {
    /// Validate raw options. `default_hub` applies when the options name none.
    ///
    /// Visibility defaults to public when unset.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when zero or several sources are set,
    /// the hub URL is invalid, or a URL source is not `http(s)`.
    pub fn from_options(options: PublishOptions, default_hub: &str) -> Result<Self, CoreError> {
        let file = options.file.filter(|p| !p.as_os_str().is_empty());
        let dir = options.dir.filter(|p| !p.as_os_str().is_empty());
        let url = non_blank(options.url);

        let count = [file.is_some(), dir.is_some(), url.is_some()]
            .into_iter()
            .filter(|set| *set)
            .count();
        let source = match (file, dir, url) {
            _ if count > 1 => {
                return Err(CoreError::Validation(
                    "please provide only one of: --file, --dir, or --url".into(),
                ));
            }
            (Some(file), None, None) => Source::File(file),
            (None, Some(dir), None) => Source::Dir(dir),
            (None, None, Some(url)) => Source::Url(validate_source_url(&url)?),
            _ => {
                return Err(CoreError::Validation(
                    "please provide one of: --file, --dir, or --url".into(),
                ));
            }
        };

        let hub_raw = non_blank(options.hub).unwrap_or_else(|| default_hub.to_string());
        let hub = HubUrl::parse(&hub_raw)?;

        let mut metadata = options.metadata.normalized();
        metadata.visibility.get_or_insert(Visibility::Public);

        Ok(Self {
            source,
            hub,
            metadata,
            target_did: non_blank(options.did),
            force_new: options.force_new,
            config_path: options.config_path,
        })
    }
}

fn validate_source_url(raw: &str) -> Result<String, CoreError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| CoreError::Validation(format!("invalid source URL '{raw}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CoreError::Validation(format!(
            "invalid source URL '{raw}': scheme must be http or https"
        )));
    }
    Ok(raw.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
