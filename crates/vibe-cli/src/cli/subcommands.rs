use clap::{Args, Subcommand};

/// Authorization commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Authorize in the browser and store the access token.
    Login(HubArgs),
    /// Remove the stored access token.
    Logout(HubArgs),
    /// Show whether an access token is available.
    Status(HubArgs),
}

#[derive(Clone, Debug, Args)]
pub struct HubArgs {
    /// Hub URL (defaults to the configured hub).
    #[arg(long)]
    pub hub: Option<String>,
}
