//! Playlist Porter - migrate playlists between streaming services.
//!
//! Mirrors a source account's playlists into a local SQLite database,
//! matches each track against the target service's catalog, and
//! replays the playlists there in order. Interrupted transfers resume
//! from the persisted state.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod replicator;
pub mod store;
#[cfg(test)]
pub mod test_utils;
pub mod transfer;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("playlist_porter=info".parse().unwrap()))
        .init();

    // Try to run a CLI command
    if cli::run_command(&args)? {
        // A command was executed, exit normally
        return Ok(());
    }

    // No command specified, print usage
    cli::Cli::command().print_help()?;
    Ok(())
}
