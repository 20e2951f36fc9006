use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use vibe_auth::{FlowSettings, HubAuthenticator, TokenStore};
use vibe_config::VibeConfig;
use vibe_core::{PublishMetadata, PublishOptions, PublishOutcome, PublishRequest, Visibility};
use vibe_publish::{JsonHistoryStore, MonitorSettings, PublishError, PublishSettings, Publisher};

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::PublishArgs;
use crate::output::output;
use crate::progress;

/// Handle `myvibe publish`. Always prints a [`PublishOutcome`].
pub async fn handle(
    args: &PublishArgs,
    flags: &GlobalFlags,
    config: &VibeConfig,
) -> anyhow::Result<i32> {
    let (request, data_dir) = match prepare(args, config) {
        Ok(prepared) => prepared,
        Err(error) => {
            tracing::debug!(error = %format!("{error:#}"), "publish request rejected");
            return report(&PublishOutcome::failed(format!("{error:#}")), flags);
        }
    };

    let mut publisher = build_publisher(config, &data_dir);
    let renderer = progress::render_events(publisher.subscribe());

    let outcome = until_shutdown(publisher.publish(&request), shutdown_signal()).await;

    drop(publisher);
    join_renderer(renderer).await;

    if outcome.success
        && let Some(path) = &request.config_path
    {
        remove_publish_file(path);
    }

    report(&outcome, flags)
}

async fn join_renderer(renderer: tokio::task::JoinHandle<()>) {
    if let Err(error) = renderer.await {
        tracing::warn!(%error, "progress renderer stopped abnormally");
    }
}

/// Run the pipeline unless a shutdown request arrives first.
///
/// Dropping the pipeline future releases any temporary archive.
async fn until_shutdown(
    publish: impl Future<Output = PublishOutcome>,
    shutdown: impl Future<Output = ()>,
) -> PublishOutcome {
    tokio::select! {
        outcome = publish => outcome,
        () = shutdown => {
            tracing::warn!("interrupted, publish cancelled");
            PublishOutcome::failed(PublishError::Cancelled.to_string())
        }
    }
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

fn report(outcome: &PublishOutcome, flags: &GlobalFlags) -> anyhow::Result<i32> {
    output(outcome, flags.format)?;
    Ok(if outcome.success { 0 } else { 1 })
}

fn prepare(args: &PublishArgs, config: &VibeConfig) -> anyhow::Result<(PublishRequest, PathBuf)> {
    let request = build_request(args, &config.hub.url)?;
    let data_dir = bootstrap::data_dir(config)?;
    Ok((request, data_dir))
}

/// Merge the publish file (if any) under the flags and validate the result.
fn build_request(args: &PublishArgs, default_hub: &str) -> anyhow::Result<PublishRequest> {
    let base = match &args.config {
        Some(path) => vibe_config::load_publish_file(path)?,
        None => PublishOptions::default(),
    };
    let options = vibe_config::merge_options(base, flag_options(args)?);
    Ok(PublishRequest::from_options(options, default_hub)?)
}

fn flag_options(args: &PublishArgs) -> anyhow::Result<PublishOptions> {
    let visibility = args
        .visibility
        .as_deref()
        .map(str::parse::<Visibility>)
        .transpose()?;

    Ok(PublishOptions {
        file: args.file.clone(),
        dir: args.dir.clone(),
        url: args.url.clone(),
        hub: args.hub.clone(),
        metadata: PublishMetadata {
            title: args.title.clone(),
            description: args.description.clone(),
            visibility,
            ..PublishMetadata::default()
        },
        did: args.did.clone(),
        force_new: args.force_new,
        config_path: None,
    })
}

fn build_publisher(config: &VibeConfig, data_dir: &Path) -> Publisher {
    let hub = bootstrap::hub_client(config);
    let auth = HubAuthenticator::new(
        TokenStore::new(data_dir),
        hub.http().clone(),
        FlowSettings {
            timeout: config.auth.timeout(),
            poll_interval: config.auth.poll_interval(),
        },
    );
    let settings = PublishSettings {
        monitor: MonitorSettings {
            poll_interval: config.monitor.poll_interval(),
            timeout: config.monitor.timeout(),
        },
        max_archive_bytes: config.general.max_archive_bytes(),
    };

    Publisher::new(
        Arc::new(hub),
        Arc::new(auth),
        Arc::new(JsonHistoryStore::new(data_dir)),
        settings,
    )
}

fn remove_publish_file(path: &Path) {
    match std::fs::remove_file(path).context("remove publish config file") {
        Ok(()) => tracing::debug!(path = %path.display(), "publish config file removed"),
        Err(error) => {
            tracing::warn!(path = %path.display(), error = %format!("{error:#}"), "failed to remove publish config file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vibe_core::Source;

    const HUB: &str = "https://www.myvibe.so";

    fn write_publish_file(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("publish.yaml");
        std::fs::write(&path, body).expect("write publish file");
        path
    }

    #[test]
    fn flags_alone_build_a_request() {
        let args = PublishArgs {
            dir: Some("./dist".into()),
            title: Some("My App".into()),
            visibility: Some("Private".into()),
            ..PublishArgs::default()
        };

        let request = build_request(&args, HUB).expect("request");
        assert_eq!(request.source, Source::Dir("./dist".into()));
        assert_eq!(request.hub.as_str(), HUB);
        assert_eq!(request.metadata.title.as_deref(), Some("My App"));
        assert_eq!(request.metadata.visibility, Some(Visibility::Private));
        assert_eq!(request.config_path, None);
    }

    #[test]
    fn invalid_visibility_is_a_validation_error() {
        let args = PublishArgs {
            dir: Some("./dist".into()),
            visibility: Some("friends".into()),
            ..PublishArgs::default()
        };

        let err = build_request(&args, HUB).expect_err("invalid visibility");
        assert!(err.to_string().contains("invalid visibility"));
    }

    #[test]
    fn missing_source_is_rejected() {
        let err = build_request(&PublishArgs::default(), HUB).expect_err("no source");
        assert!(err.to_string().contains("--file, --dir, or --url"));
    }

    #[test]
    fn flags_override_the_publish_file() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = write_publish_file(
            tmp.path(),
            "source:\n  type: dir\n  path: ./dist\n  did: z-file\nhub: https://file.example\nmetadata:\n  title: From File\n  description: kept\n",
        );
        let args = PublishArgs {
            config: Some(path.clone()),
            url: Some("https://example.com/app".into()),
            title: Some("From Flag".into()),
            ..PublishArgs::default()
        };

        let request = build_request(&args, HUB).expect("request");
        assert_eq!(request.source, Source::Url("https://example.com/app".into()));
        assert_eq!(request.hub.as_str(), "https://file.example");
        assert_eq!(request.target_did.as_deref(), Some("z-file"));
        assert_eq!(request.metadata.title.as_deref(), Some("From Flag"));
        assert_eq!(request.metadata.description.as_deref(), Some("kept"));
        assert_eq!(
            request.config_path,
            Some(std::path::absolute(&path).expect("absolute"))
        );
    }

    #[test]
    fn missing_publish_file_is_reported() {
        let args = PublishArgs {
            config: Some("/nonexistent/publish.yaml".into()),
            ..PublishArgs::default()
        };
        assert!(build_request(&args, HUB).is_err());
    }

    #[test]
    fn publish_file_is_removed() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = write_publish_file(tmp.path(), "hub: https://hub.example\n");
        remove_publish_file(&path);
        assert!(!path.exists());

        // A second removal only logs.
        remove_publish_file(&path);
    }

    struct DropFlag(Arc<std::sync::atomic::AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn shutdown_cancels_and_drops_the_pipeline() {
        let dropped = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let guard = DropFlag(dropped.clone());
        let publish = async move {
            let _guard = guard;
            std::future::pending::<PublishOutcome>().await
        };

        let outcome = until_shutdown(publish, async {}).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error, Some(PublishError::Cancelled.to_string()));
        assert!(dropped.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn finished_pipeline_wins_over_idle_shutdown() {
        let done = PublishOutcome::published("d1".into(), "https://hub.example/d1".into());
        let outcome = until_shutdown(
            std::future::ready(done.clone()),
            std::future::pending::<()>(),
        )
        .await;
        assert_eq!(outcome, done);
    }

    #[tokio::test]
    async fn renderer_panic_is_absorbed() {
        let renderer = tokio::spawn(async {
            panic!("renderer failed");
        });
        join_renderer(renderer).await;
    }
}
