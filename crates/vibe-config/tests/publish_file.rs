//! Integration tests for YAML publish-file loading.
//!
//! Uses `figment::Jail` so each test runs in its own temp working directory.

use std::path::PathBuf;

use figment::Jail;
use vibe_config::{load_publish_file, merge_options};
use vibe_core::{PublishOptions, PublishRequest, TagRef, Visibility};

#[test]
fn loads_full_publish_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "publish.yaml",
            r"
source:
  type: dir
  path: ./dist
  did: z2qaExisting
hub: https://hub.example/
metadata:
  title: My App
  description: A cool app
  visibility: private
  coverImage: https://cdn.example/cover.png
  githubRepo: https://github.com/acme/app
  platformTags: [1, 2]
  techStackTags: [3]
  categoryTags: [5]
  modelTags: [gpt]
",
        )?;

        let options = load_publish_file(&jail.directory().join("publish.yaml"))
            .expect("publish file loads");

        assert_eq!(options.dir, Some(PathBuf::from("./dist")));
        assert_eq!(options.file, None);
        assert_eq!(options.did.as_deref(), Some("z2qaExisting"));
        assert_eq!(options.hub.as_deref(), Some("https://hub.example/"));
        assert_eq!(options.metadata.title.as_deref(), Some("My App"));
        assert_eq!(options.metadata.visibility, Some(Visibility::Private));
        assert_eq!(
            options.metadata.cover_image.as_deref(),
            Some("https://cdn.example/cover.png")
        );
        assert_eq!(
            options.metadata.platform_tags,
            vec![TagRef::Id(1), TagRef::Id(2)]
        );
        assert_eq!(options.metadata.model_tags, vec![TagRef::Slug("gpt".into())]);
        assert!(options
            .config_path
            .as_deref()
            .is_some_and(|p| p.ends_with("publish.yaml")));
        Ok(())
    });
}

#[test]
fn url_source_and_flags_merge_into_valid_request() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "publish.yaml",
            r"
source:
  type: url
  path: https://example.com/app
metadata:
  title: Imported
",
        )?;

        let base = load_publish_file(&jail.directory().join("publish.yaml"))
            .expect("publish file loads");
        let flags = PublishOptions {
            hub: Some("https://flag-hub.example".into()),
            ..Default::default()
        };

        let request = PublishRequest::from_options(merge_options(base, flags), "https://default.example")
            .expect("valid request");
        assert_eq!(request.hub.as_str(), "https://flag-hub.example");
        assert_eq!(request.metadata.title.as_deref(), Some("Imported"));
        Ok(())
    });
}

#[test]
fn conflicting_flag_sources_still_fail_validation() {
    Jail::expect_with(|jail| {
        jail.create_file("publish.yaml", "source:\n  type: dir\n  path: ./dist\n")?;

        let base = load_publish_file(&jail.directory().join("publish.yaml"))
            .expect("publish file loads");
        let flags = PublishOptions {
            file: Some("a.zip".into()),
            url: Some("https://example.com".into()),
            ..Default::default()
        };

        let result = PublishRequest::from_options(merge_options(base, flags), "https://hub.example");
        assert!(result.is_err());
        Ok(())
    });
}

#[test]
fn malformed_yaml_is_an_error() {
    Jail::expect_with(|jail| {
        jail.create_file("publish.yaml", "source:\n  type: floppy\n  path: x\n")?;
        let result = load_publish_file(&jail.directory().join("publish.yaml"));
        assert!(result.is_err());
        Ok(())
    });
}
