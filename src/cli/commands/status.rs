//! Transfer progress inspection.

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::model::TransferStatus;
use crate::store::{self, identity};

use super::source_client;

/// Show mirror and replication counts for the current user
pub fn cmd_status(
    rt: &Runtime,
    config: &Config,
    source_token: Option<&str>,
    user: Option<&str>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let user_id = match user {
            Some(user) => user.to_string(),
            None => {
                let source = source_client(config, source_token)?;
                source.current_user_id().await?
            }
        };

        let db_dir = config.transfer.db_dir();
        if !db_dir.join(format!("{user_id}.db")).exists() {
            println!("No transfer database for user '{user_id}' yet.");
            return Ok(());
        }

        let pool = store::open(&db_dir, &user_id).await?;
        let summary = store::summary(&pool).await?;

        println!("User: {user_id}");
        let phase = match summary.status {
            TransferStatus::IngestPending => "ingesting source playlists",
            TransferStatus::IngestComplete => "matching and replicating",
        };
        println!("Phase: {phase}");
        println!(
            "Playlists: {} mirrored, {} linked, {} fully replicated",
            summary.playlists, summary.linked, summary.replicated
        );
        println!(
            "Tracks: {} mirrored, {} matched, {} confirmed without a match",
            summary.tracks, summary.matches, summary.no_match
        );

        for playlist in store::mirrored_playlists(&pool).await? {
            let state = match identity::playlist_link(&pool, &playlist.source_id).await? {
                Some(link) if link.done => "replicated",
                Some(_) => "in progress",
                None => "pending",
            };
            println!("  {} [{}]", playlist.name, state);
        }
        Ok(())
    })
}
