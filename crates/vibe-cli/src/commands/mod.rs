pub mod auth;
pub mod publish;
pub mod tags;

use vibe_config::VibeConfig;

use crate::cli::{Commands, GlobalFlags};

/// Run `command` and return the process exit code.
pub async fn dispatch(
    command: Commands,
    flags: &GlobalFlags,
    config: &VibeConfig,
) -> anyhow::Result<i32> {
    match command {
        Commands::Publish(args) => publish::handle(&args, flags, config).await,
        Commands::Tags(args) => tags::handle(&args, flags, config).await,
        Commands::Auth { action } => auth::handle(&action, flags, config).await,
    }
}
