//! Command-line interface for playlist-porter.
//!
//! This module provides CLI commands for listing source playlists,
//! running transfers, and inspecting transfer progress.

mod commands;

pub use commands::{Cli, Commands, run_command};
