//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `transfer`: playlist listing and the transfer pipeline
//! - `status`: per-user mirror and replication progress

mod status;
mod transfer;

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

use crate::config::Config;

pub use status::cmd_status;
pub use transfer::{cmd_playlists, cmd_transfer};

/// Playlist Porter CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter config file to edit tokens into
    Init,
    /// List the source account's playlists with their selection numbers
    Playlists {
        /// Source API token (or set SOURCE_TOKEN env var)
        #[arg(long, env = "SOURCE_TOKEN")]
        source_token: Option<String>,
    },
    /// Transfer playlists from the source account to the target service
    Transfer {
        /// Source API token (or set SOURCE_TOKEN env var)
        #[arg(long, env = "SOURCE_TOKEN")]
        source_token: Option<String>,
        /// Target bridge token (or set TARGET_TOKEN env var)
        #[arg(long, env = "TARGET_TOKEN")]
        target_token: Option<String>,
        /// Target bridge base URL (overrides config)
        #[arg(long)]
        target_url: Option<String>,
        /// Transfer every playlist
        #[arg(long, conflicts_with_all = ["include", "exclude"])]
        all: bool,
        /// Transfer only these playlists (numbers from `playlists`)
        #[arg(long, value_delimiter = ',', conflicts_with = "exclude")]
        include: Vec<usize>,
        /// Transfer everything except these playlists
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<usize>,
    },
    /// Show transfer progress for the current user
    Status {
        /// Source API token (or set SOURCE_TOKEN env var)
        #[arg(long, env = "SOURCE_TOKEN")]
        source_token: Option<String>,
        /// Skip the user lookup and read this user's database directly
        #[arg(long)]
        user: Option<String>,
    },
}

/// Run the specified CLI command.
///
/// Returns `Ok(true)` if a command was run, `Ok(false)` if no command
/// was specified (meaning usage help should be printed).
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let rt = Runtime::new()?;
    let config = crate::config::load();

    match &cli.command {
        Some(Commands::Init) => {
            cmd_init(&config)?;
            Ok(true)
        }
        Some(Commands::Playlists { source_token }) => {
            cmd_playlists(&rt, &config, source_token.as_deref())?;
            Ok(true)
        }
        Some(Commands::Transfer {
            source_token,
            target_token,
            target_url,
            all,
            include,
            exclude,
        }) => {
            cmd_transfer(
                &rt,
                &config,
                source_token.as_deref(),
                target_token.as_deref(),
                target_url.as_deref(),
                *all,
                include,
                exclude,
            )?;
            Ok(true)
        }
        Some(Commands::Status { source_token, user }) => {
            cmd_status(&rt, &config, source_token.as_deref(), user.as_deref())?;
            Ok(true)
        }
        None => Ok(false),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Write the current (or default) config back to disk so the user has a
/// file to edit tokens into.
fn cmd_init(config: &Config) -> anyhow::Result<()> {
    crate::config::save(config)?;
    if let Some(path) = crate::config::config_path() {
        println!("Config written to {}", path.display());
        println!("Edit it to add your source and target tokens.");
    }
    Ok(())
}

/// Resolve a token from CLI arg, falling back to the config file.
pub(crate) fn resolve_token(
    arg: Option<&str>,
    from_config: Option<&str>,
    name: &str,
) -> anyhow::Result<String> {
    arg.or(from_config)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No {name} provided (pass --{name} or add it to {:?})",
            crate::config::config_path().unwrap_or_default()))
}

/// Build the source client from args and config.
pub(crate) fn source_client(
    config: &Config,
    source_token: Option<&str>,
) -> anyhow::Result<crate::catalog::SpotifyClient> {
    let token = resolve_token(
        source_token,
        config.credentials.source_token.as_deref(),
        "source-token",
    )?;
    Ok(crate::catalog::SpotifyClient::new(token))
}

/// Build the target client from args and config.
pub(crate) fn target_client(
    config: &Config,
    target_token: Option<&str>,
    target_url: Option<&str>,
) -> anyhow::Result<crate::catalog::YtMusicClient> {
    let token = resolve_token(
        target_token,
        config.credentials.target_token.as_deref(),
        "target-token",
    )?;
    let url = target_url.unwrap_or(&config.credentials.target_url);
    Ok(crate::catalog::YtMusicClient::new(url, token))
}
