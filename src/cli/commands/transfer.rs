//! Playlist listing and transfer commands.

use anyhow::bail;
use tokio::runtime::Runtime;
use tracing::info;

use crate::catalog::SourcePlaylist;
use crate::config::Config;
use crate::store;
use crate::transfer::Orchestrator;

use super::{source_client, target_client};

/// List the source account's playlists with their selection numbers
pub fn cmd_playlists(
    rt: &Runtime,
    config: &Config,
    source_token: Option<&str>,
) -> anyhow::Result<()> {
    let source = source_client(config, source_token)?;
    rt.block_on(async {
        let playlists = source.list_playlists().await?;
        if playlists.is_empty() {
            println!("No playlists found.");
            return Ok(());
        }
        for (i, playlist) in playlists.iter().enumerate() {
            println!("{:>3}. {}", i + 1, playlist.name);
        }
        Ok(())
    })
}

/// Run the transfer pipeline over the selected playlists
#[allow(clippy::too_many_arguments)]
pub fn cmd_transfer(
    rt: &Runtime,
    config: &Config,
    source_token: Option<&str>,
    target_token: Option<&str>,
    target_url: Option<&str>,
    all: bool,
    include: &[usize],
    exclude: &[usize],
) -> anyhow::Result<()> {
    if !all && include.is_empty() && exclude.is_empty() {
        bail!("Select playlists with --all, --include, or --exclude");
    }

    let source = source_client(config, source_token)?;
    let target = target_client(config, target_token, target_url)?;

    rt.block_on(async {
        let user_id = source.current_user_id().await?;
        info!(user = %user_id, "Resolved source account");

        let playlists = source.list_playlists().await?;
        let selected = select_playlists(playlists, all, include, exclude)?;
        if selected.is_empty() {
            bail!("Selection matched no playlists");
        }
        println!("Transferring {} playlist(s)...", selected.len());

        let pool = store::open(&config.transfer.db_dir(), &user_id).await?;
        let orchestrator = Orchestrator::new(
            &source,
            &target,
            &pool,
            config.transfer.matcher_config(),
            config.transfer.replicator_config(),
        );
        let report = orchestrator.run(&selected).await?;

        println!(
            "Done: {} replicated, {} partial, {} already up to date",
            report.playlists_replicated, report.playlists_partial, report.already_done
        );
        println!(
            "Tracks: {} matched, {} without a match",
            report.tracks_matched, report.tracks_unmatched
        );
        for failure in &report.failures {
            eprintln!("  {}: {}", failure.playlist, failure.detail);
        }
        if !report.clean() {
            println!("Re-run the same command to retry what failed.");
        }
        Ok(())
    })
}

/// Apply `--all` / `--include` / `--exclude` to the numbered playlist
/// list. Numbers are 1-based, matching the `playlists` output.
fn select_playlists(
    playlists: Vec<SourcePlaylist>,
    all: bool,
    include: &[usize],
    exclude: &[usize],
) -> anyhow::Result<Vec<SourcePlaylist>> {
    let total = playlists.len();
    for &n in include.iter().chain(exclude) {
        if n == 0 || n > total {
            bail!("Playlist number {n} is out of range (1..={total})");
        }
    }

    let selected = playlists
        .into_iter()
        .enumerate()
        .filter(|(i, _)| {
            let n = i + 1;
            if all {
                true
            } else if !include.is_empty() {
                include.contains(&n)
            } else {
                !exclude.contains(&n)
            }
        })
        .map(|(_, p)| p)
        .collect();
    Ok(selected)
}
