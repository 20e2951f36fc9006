mod login;
mod logout;
mod status;

use vibe_config::VibeConfig;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;

/// Handle `myvibe auth <subcommand>`.
pub async fn handle(
    action: &AuthCommands,
    flags: &GlobalFlags,
    config: &VibeConfig,
) -> anyhow::Result<i32> {
    match action {
        AuthCommands::Login(args) => login::handle(args, flags, config).await,
        AuthCommands::Logout(args) => logout::handle(args, flags, config),
        AuthCommands::Status(args) => status::handle(args, flags, config),
    }
}
