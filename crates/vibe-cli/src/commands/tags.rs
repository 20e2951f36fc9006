use serde::Serialize;
use vibe_config::VibeConfig;
use vibe_hub::{TagCatalog, TagsReport};

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::TagsArgs;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct TagsFailure {
    success: bool,
    error: String,
}

/// Handle `myvibe tags`.
pub async fn handle(args: &TagsArgs, flags: &GlobalFlags, config: &VibeConfig) -> anyhow::Result<i32> {
    let progress = Progress::spinner("Fetching tags...");
    let result = fetch(args, config).await;
    progress.finish_clear();

    match result {
        Ok(report) => {
            if report.expired {
                tracing::warn!(hub = %report.hub, "tag fetch failed, showing expired cache");
            }
            output(&report, flags.format)?;
            Ok(0)
        }
        Err(error) => {
            output(
                &TagsFailure {
                    success: false,
                    error: format!("{error:#}"),
                },
                flags.format,
            )?;
            Ok(1)
        }
    }
}

async fn fetch(args: &TagsArgs, config: &VibeConfig) -> anyhow::Result<TagsReport> {
    let hub = bootstrap::hub_url(args.hub.as_deref(), config)?;
    let cache_dir = bootstrap::data_dir(config)?.join("cache");
    let catalog = TagCatalog::new(bootstrap::hub_client(config), &cache_dir);
    Ok(catalog.get(&hub, args.refresh).await?)
}
