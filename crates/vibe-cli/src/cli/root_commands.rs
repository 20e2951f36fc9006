use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::subcommands::AuthCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Publish a file, directory, or URL to the hub.
    Publish(PublishArgs),
    /// List the hub's platform, tech-stack, model, and category tags.
    Tags(TagsArgs),
    /// Hub authorization.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
}

#[derive(Clone, Debug, Default, Args)]
pub struct PublishArgs {
    /// Publish config file (YAML); flags override its values.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// HTML file or ZIP archive to publish.
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    /// Directory to compress and publish.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
    /// Remote URL to import.
    #[arg(short, long)]
    pub url: Option<String>,
    /// Hub URL (defaults to the configured hub).
    #[arg(long)]
    pub hub: Option<String>,
    /// Title shown on the hub.
    #[arg(short, long)]
    pub title: Option<String>,
    /// Description shown on the hub.
    #[arg(long = "desc")]
    pub description: Option<String>,
    /// public or private.
    #[arg(short, long)]
    pub visibility: Option<String>,
    /// Update this existing vibe instead of the one recorded in history.
    #[arg(long)]
    pub did: Option<String>,
    /// Always create a new vibe.
    #[arg(long = "new")]
    pub force_new: bool,
}

#[derive(Clone, Debug, Args)]
pub struct TagsArgs {
    /// Hub URL (defaults to the configured hub).
    #[arg(long)]
    pub hub: Option<String>,
    /// Ignore the local tag cache.
    #[arg(long)]
    pub refresh: bool,
}
