//! Per-run publish file (YAML) and its merge with command-line flags.
//!
//! ```yaml
//! source:
//!   type: dir
//!   path: ./dist
//!   did: z2qaXXXX        # optional explicit target
//! hub: https://www.myvibe.so
//! metadata:
//!   title: My App
//!   visibility: public
//!   platformTags: [1, 2]
//! ```

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Format, Yaml},
};
use serde::Deserialize;
use vibe_core::{PublishMetadata, PublishOptions};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SourceType {
    Dir,
    File,
    Url,
}

#[derive(Debug, Deserialize)]
struct SourceSection {
    #[serde(rename = "type")]
    kind: SourceType,
    path: String,
    #[serde(default)]
    did: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PublishFile {
    #[serde(default)]
    source: Option<SourceSection>,
    #[serde(default)]
    hub: Option<String>,
    #[serde(default)]
    metadata: PublishMetadata,
}

/// Load a publish file into raw options.
///
/// Relative source paths stay relative; they are resolved against the
/// working directory when the source is inspected. The absolute path of the
/// file itself is recorded in `config_path` for post-publish cleanup.
///
/// # Errors
///
/// Returns [`ConfigError::PublishFileNotFound`] if the file does not exist and
/// [`ConfigError::Figment`] if it is not valid YAML of the expected shape.
pub fn load_publish_file(path: &Path) -> Result<PublishOptions, ConfigError> {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    if !absolute.is_file() {
        return Err(ConfigError::PublishFileNotFound(absolute));
    }

    let file: PublishFile = Figment::from(Yaml::file(&absolute)).extract()?;

    let mut options = PublishOptions {
        hub: file.hub,
        metadata: file.metadata,
        config_path: Some(absolute),
        ..Default::default()
    };

    if let Some(source) = file.source {
        match source.kind {
            SourceType::Dir => options.dir = Some(PathBuf::from(source.path)),
            SourceType::File => options.file = Some(PathBuf::from(source.path)),
            SourceType::Url => options.url = Some(source.path),
        }
        options.did = source.did;
    }

    Ok(options)
}

/// Merge flags over publish-file options. Flags always win.
///
/// Source selection is one field: if the flags name any source, the file's
/// source is discarded entirely. Several source flags together are still
/// passed through so validation can reject them.
#[must_use]
pub fn merge_options(base: PublishOptions, flags: PublishOptions) -> PublishOptions {
    let flags_pick_source = flags.file.is_some() || flags.dir.is_some() || flags.url.is_some();
    let (file, dir, url) = if flags_pick_source {
        (flags.file, flags.dir, flags.url)
    } else {
        (base.file, base.dir, base.url)
    };

    PublishOptions {
        file,
        dir,
        url,
        hub: flags.hub.or(base.hub),
        metadata: base.metadata.overridden_by(flags.metadata),
        did: flags.did.or(base.did),
        force_new: flags.force_new || base.force_new,
        config_path: flags.config_path.or(base.config_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vibe_core::{TagRef, Visibility};

    #[test]
    fn flag_source_replaces_file_source() {
        let base = PublishOptions {
            dir: Some("dist".into()),
            did: Some("from-file".into()),
            ..Default::default()
        };
        let flags = PublishOptions {
            url: Some("https://example.com".into()),
            ..Default::default()
        };

        let merged = merge_options(base, flags);
        assert_eq!(merged.dir, None);
        assert_eq!(merged.url.as_deref(), Some("https://example.com"));
        assert_eq!(merged.did.as_deref(), Some("from-file"));
    }

    #[test]
    fn file_values_survive_when_flags_are_silent() {
        let base = PublishOptions {
            file: Some("site.zip".into()),
            hub: Some("https://hub.example".into()),
            metadata: PublishMetadata {
                title: Some("File title".into()),
                model_tags: vec![TagRef::Id(6)],
                ..Default::default()
            },
            ..Default::default()
        };
        let flags = PublishOptions {
            metadata: PublishMetadata {
                visibility: Some(Visibility::Private),
                ..Default::default()
            },
            force_new: true,
            ..Default::default()
        };

        let merged = merge_options(base, flags);
        assert_eq!(merged.file, Some(PathBuf::from("site.zip")));
        assert_eq!(merged.hub.as_deref(), Some("https://hub.example"));
        assert_eq!(merged.metadata.title.as_deref(), Some("File title"));
        assert_eq!(merged.metadata.visibility, Some(Visibility::Private));
        assert_eq!(merged.metadata.model_tags, vec![TagRef::Id(6)]);
        assert!(merged.force_new);
    }

    #[test]
    fn missing_publish_file_is_reported() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let err = load_publish_file(&tmp.path().join("nope.yaml")).expect_err("missing");
        assert!(matches!(err, ConfigError::PublishFileNotFound(_)));
    }
}
