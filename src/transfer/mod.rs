//! Reconciliation orchestrator - drives the whole pipeline.
//!
//! A state machine over the persisted transfer status:
//!
//! - `ingest-pending`: selected playlists are mirrored concurrently
//!   (one task per playlist, serialized through the store's single
//!   connection). The flag flips to `ingest-complete` only after every
//!   selected playlist's batches were acknowledged.
//! - `ingest-complete`: selected playlists missing from the mirror
//!   (added at the source since the first transfer) are mirrored first.
//!   Then for every mirrored playlist not yet fully replicated, create
//!   the target playlist (at most once across runs), resolve the
//!   remaining unmatched tracks, persist the matches, and replay the
//!   ordered membership in batches.
//!
//! Failures never unwind past this module: each playlist's task catches
//! its own errors, logs them with playlist identity, and yields a
//! structured failure into the [`RunReport`]. A re-run over fully
//! replicated playlists is a no-op pass.

use std::collections::HashSet;

use futures::future::join_all;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::catalog::domain::SourcePlaylist;
use crate::catalog::traits::{SourceCatalog, TargetCatalog};
use crate::error::{Error, Result, ResultExt};
use crate::matcher::{MatchFailure, Matcher, MatcherConfig};
use crate::model::TransferStatus;
use crate::replicator::{Replicator, ReplicatorConfig};
use crate::store::{self, identity, mirror};

/// One recorded failure, scoped to a playlist.
#[derive(Debug, Clone)]
pub struct TransferFailure {
    /// Name of the affected playlist
    pub playlist: String,
    /// Human-readable cause
    pub detail: String,
}

/// Aggregated outcome of one orchestrator run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Playlists mirrored during this run's ingest phase
    pub playlists_ingested: usize,
    /// Playlists whose membership replay completed this run
    pub playlists_replicated: usize,
    /// Playlists replicated with gaps or failed batches left over
    pub playlists_partial: usize,
    /// Playlists already fully replicated before this run
    pub already_done: usize,
    /// Tracks newly matched this run
    pub tracks_matched: usize,
    /// Membership slots still unresolved after matching
    pub tracks_unmatched: usize,
    /// Per-playlist failures, for visibility only
    pub failures: Vec<TransferFailure>,
}

impl RunReport {
    /// True when nothing failed and nothing is left partial.
    pub fn clean(&self) -> bool {
        self.failures.is_empty() && self.playlists_partial == 0
    }
}

/// Outcome of replicating one playlist.
enum PlaylistOutcome {
    /// Link record says membership replay already completed.
    AlreadyDone,
    /// Replay finished; counts are (matched this run, gaps remaining).
    Replicated { matched: usize, unmatched: usize },
    /// Replay left failed batches or retriable tracks behind.
    Partial { matched: usize, unmatched: usize },
}

/// Drives ingest → match → replicate for one user session.
///
/// Holds only borrowed collaborators; lifetime is one run.
pub struct Orchestrator<'a, S: SourceCatalog, T: TargetCatalog> {
    source: &'a S,
    target: &'a T,
    pool: &'a SqlitePool,
    matcher_config: MatcherConfig,
    replicator_config: ReplicatorConfig,
}

impl<'a, S: SourceCatalog, T: TargetCatalog> Orchestrator<'a, S, T> {
    pub fn new(
        source: &'a S,
        target: &'a T,
        pool: &'a SqlitePool,
        matcher_config: MatcherConfig,
        replicator_config: ReplicatorConfig,
    ) -> Self {
        Self {
            source,
            target,
            pool,
            matcher_config,
            replicator_config,
        }
    }

    /// Run the pipeline over the selected playlists, resuming from the
    /// persisted status.
    pub async fn run(&self, selected: &[SourcePlaylist]) -> Result<RunReport> {
        let mut report = RunReport::default();

        let first_pass =
            store::transfer_status(self.pool).await? == TransferStatus::IngestPending;
        let mirrored: HashSet<String> = store::mirrored_playlists(self.pool)
            .await?
            .into_iter()
            .map(|p| p.source_id)
            .collect();
        // After the first pass, only playlists added at the source
        // since then still need mirroring.
        let to_ingest: Vec<&SourcePlaylist> = selected
            .iter()
            .filter(|p| first_pass || !mirrored.contains(&p.id))
            .collect();

        let mut ingest_failed: HashSet<String> = HashSet::new();
        if !to_ingest.is_empty() {
            info!(playlists = to_ingest.len(), "Ingest phase starting");
            let results = join_all(to_ingest.iter().map(|p| self.ingest_playlist(p))).await;

            for (playlist, result) in to_ingest.iter().zip(results) {
                match result {
                    Ok(count) => {
                        info!(playlist = %playlist.name, tracks = count, "Playlist mirrored");
                        report.playlists_ingested += 1;
                    }
                    Err(e) => {
                        error!(playlist = %playlist.name, error = %e, "Ingestion failed");
                        ingest_failed.insert(playlist.id.clone());
                        report.failures.push(TransferFailure {
                            playlist: playlist.name.clone(),
                            detail: format!("ingestion failed: {e}"),
                        });
                    }
                }
            }
        }

        if first_pass {
            if !report.failures.is_empty() {
                // Stay in ingest-pending so the next run retries the
                // failed playlists; replication waits for a full mirror.
                warn!(
                    failed = report.failures.len(),
                    "Ingest incomplete, not advancing transfer status"
                );
                return Ok(report);
            }
            store::set_transfer_status(self.pool, TransferStatus::IngestComplete)
                .await
                .with_context("advancing transfer status")?;
            info!("Ingest phase complete");
        }

        let no_match: HashSet<String> =
            identity::no_match_source_ids(self.pool).await?.into_iter().collect();
        let matcher = Matcher::new(self.target, self.matcher_config.clone());
        let replicator = Replicator::new(self.target, self.replicator_config.clone());

        for playlist in selected {
            // Never replicate from a missing mirror; a playlist whose
            // ingest just failed waits for the next run.
            if ingest_failed.contains(&playlist.id) {
                continue;
            }
            match self
                .replicate_playlist(playlist, &matcher, &replicator, &no_match)
                .await
            {
                Ok(PlaylistOutcome::AlreadyDone) => report.already_done += 1,
                Ok(PlaylistOutcome::Replicated { matched, unmatched }) => {
                    report.playlists_replicated += 1;
                    report.tracks_matched += matched;
                    report.tracks_unmatched += unmatched;
                }
                Ok(PlaylistOutcome::Partial { matched, unmatched }) => {
                    report.playlists_partial += 1;
                    report.tracks_matched += matched;
                    report.tracks_unmatched += unmatched;
                }
                Err(e) => {
                    error!(playlist = %playlist.name, error = %e, "Replication failed");
                    report.failures.push(TransferFailure {
                        playlist: playlist.name.clone(),
                        detail: format!("replication failed: {e}"),
                    });
                }
            }
        }

        info!(
            replicated = report.playlists_replicated,
            partial = report.playlists_partial,
            already_done = report.already_done,
            matched = report.tracks_matched,
            unmatched = report.tracks_unmatched,
            failures = report.failures.len(),
            "Run finished"
        );
        Ok(report)
    }

    /// Mirror one playlist's full membership graph. The membership
    /// order of `list_tracks` becomes the persisted sequence numbers.
    async fn ingest_playlist(&self, playlist: &SourcePlaylist) -> Result<usize> {
        mirror::ingest_playlists(self.pool, std::slice::from_ref(playlist)).await?;
        let tracks = self.source.list_tracks(&playlist.id).await?;

        let track_rows: Vec<(String, String)> = tracks
            .iter()
            .map(|t| (t.id.clone(), t.name.clone()))
            .collect();
        let album_rows: Vec<(String, String, String)> = tracks
            .iter()
            .map(|t| {
                (
                    t.album.id.clone(),
                    t.album.name.clone(),
                    t.album.release_date.clone(),
                )
            })
            .collect();
        let artist_rows: Vec<(String, String)> = tracks
            .iter()
            .flat_map(|t| t.artists.iter().map(|a| (a.id.clone(), a.name.clone())))
            .collect();
        let artist_credits: Vec<(String, String, i64)> = tracks
            .iter()
            .flat_map(|t| {
                t.artists
                    .iter()
                    .enumerate()
                    .map(|(ordinal, a)| (t.id.clone(), a.id.clone(), ordinal as i64))
            })
            .collect();
        let album_credits: Vec<(String, String)> = tracks
            .iter()
            .map(|t| (t.id.clone(), t.album.id.clone()))
            .collect();
        let membership: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();

        mirror::ingest_tracks(self.pool, &track_rows).await?;
        mirror::ingest_albums(self.pool, &album_rows).await?;
        mirror::ingest_artists(self.pool, &artist_rows).await?;
        mirror::ingest_artist_credits(self.pool, &artist_credits).await?;
        mirror::ingest_album_credits(self.pool, &album_credits).await?;
        mirror::ingest_membership(self.pool, &playlist.id, &membership).await?;

        Ok(tracks.len())
    }

    /// Replicate one playlist: link, match, replay.
    async fn replicate_playlist(
        &self,
        playlist: &SourcePlaylist,
        matcher: &Matcher<'a, T>,
        replicator: &Replicator<'a, T>,
        no_match: &HashSet<String>,
    ) -> Result<PlaylistOutcome> {
        let link = identity::playlist_link(self.pool, &playlist.id)
            .await
            .with_context(format!("loading link for '{}'", playlist.name))?;
        if let Some(link) = &link {
            if link.done {
                info!(playlist = %playlist.name, "Already replicated, skipping");
                return Ok(PlaylistOutcome::AlreadyDone);
            }
        }

        // Create the target playlist exactly once across runs; a crash
        // after this point resumes at the membership replay below.
        let target_playlist_id = match link {
            Some(link) => link.target_playlist_id,
            None => {
                let description = playlist.description.as_deref().unwrap_or("");
                let Some(id) = replicator
                    .create_remote_playlist(&playlist.name, description)
                    .await
                else {
                    return Err(Error::replication(format!(
                        "could not create target playlist for '{}'",
                        playlist.name
                    )));
                };
                identity::mark_playlist_linked(self.pool, &playlist.id, &id).await?;
                mirror::ingest_target_playlists(self.pool, std::slice::from_ref(&id)).await?;
                id
            }
        };

        // Resolve what is still unmatched, skipping tracks already
        // settled as no-match.
        let pending: Vec<_> = identity::unmatched_tracks(self.pool, &playlist.id)
            .await?
            .into_iter()
            .filter(|t| !no_match.contains(&t.source_id))
            .collect();
        let outcome = matcher.resolve_batch(&pending).await;

        mirror::ingest_target_tracks(self.pool, &outcome.accepted).await?;
        for (source_id, target_id) in &outcome.mappings {
            identity::record_match(self.pool, source_id, target_id).await?;
        }
        let mut retriable = false;
        for failed in &outcome.failed {
            let verdict = match &failed.failure {
                MatchFailure::NoMatch => identity::MatchVerdict::NoMatch,
                MatchFailure::SearchFailed(_) => {
                    retriable = true;
                    identity::MatchVerdict::SearchFailed
                }
            };
            identity::record_verdict(self.pool, &failed.source_id, verdict).await?;
        }

        // Replay whatever resolved, in sequence order, gaps dropped.
        let slots = identity::matched_targets(self.pool, &playlist.id).await?;
        let unmatched = slots.iter().filter(|s| s.target_track_id.is_none()).count();
        if unmatched > 0 {
            warn!(
                playlist = %playlist.name,
                gaps = unmatched,
                "Replicating partially resolved playlist"
            );
        }
        let ordered_ids: Vec<String> = slots
            .into_iter()
            .filter_map(|s| s.target_track_id)
            .collect();
        let summary = replicator
            .replay_membership(&target_playlist_id, &ordered_ids)
            .await;

        let matched = outcome.mappings.len();
        if summary.complete() && !retriable {
            // No-match gaps don't block the done flag; they won't be
            // re-searched without new information anyway.
            identity::mark_playlist_done(self.pool, &playlist.id).await?;
            Ok(PlaylistOutcome::Replicated { matched, unmatched })
        } else {
            Ok(PlaylistOutcome::Partial { matched, unmatched })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::traits::mocks::{source_track, MockSource, MockTarget};
    use crate::test_utils::temp_store;

    fn orchestrator<'a>(
        source: &'a MockSource,
        target: &'a MockTarget,
        pool: &'a SqlitePool,
    ) -> Orchestrator<'a, MockSource, MockTarget> {
        Orchestrator::new(
            source,
            target,
            pool,
            MatcherConfig::fast(),
            ReplicatorConfig::fast(),
        )
    }

    /// Source with one playlist [Alpha, Beta, Alpha, Gamma], all by "Band".
    fn loops_source() -> MockSource {
        MockSource::new("user-1").with_playlist(
            "pl-1",
            "Loops",
            vec![
                source_track("A", "Alpha", &["Band"]),
                source_track("B", "Beta", &["Band"]),
                source_track("A", "Alpha", &["Band"]),
                source_track("C", "Gamma", &["Band"]),
            ],
        )
    }

    fn script_all_hits(target: &MockTarget) {
        for (name, vid) in [("Alpha", "vid-a"), ("Beta", "vid-b"), ("Gamma", "vid-c")] {
            target.on_search_hit(&format!("{name} Band"), vid, name, "Band");
        }
    }

    #[tokio::test]
    async fn test_full_pipeline_preserves_sequence_with_duplicates() {
        let (_dir, pool) = temp_store().await;
        let source = loops_source();
        let target = MockTarget::new();
        script_all_hits(&target);

        let playlists = source.list_playlists().await.unwrap();
        let report = orchestrator(&source, &target, &pool)
            .run(&playlists)
            .await
            .unwrap();

        assert!(report.clean(), "failures: {:?}", report.failures);
        assert_eq!(report.playlists_ingested, 1);
        assert_eq!(report.playlists_replicated, 1);
        assert_eq!(report.tracks_matched, 3);
        assert_eq!(report.tracks_unmatched, 0);

        // Membership replayed in order including the duplicate Alpha
        assert_eq!(
            target.appended_ids(),
            vec!["vid-a", "vid-b", "vid-a", "vid-c"]
        );
        assert_eq!(
            store::transfer_status(&pool).await.unwrap(),
            TransferStatus::IngestComplete
        );
    }

    #[tokio::test]
    async fn test_rerun_is_noop_for_linked_playlists() {
        let (_dir, pool) = temp_store().await;
        let source = loops_source();
        let target = MockTarget::new();
        script_all_hits(&target);

        let playlists = source.list_playlists().await.unwrap();
        let orchestrator = orchestrator(&source, &target, &pool);
        orchestrator.run(&playlists).await.unwrap();

        let report = orchestrator.run(&playlists).await.unwrap();
        assert_eq!(report.already_done, 1);
        assert_eq!(report.playlists_replicated, 0);
        // No second playlist creation, no appends, no searches
        assert_eq!(target.created_count(), 1);
        assert_eq!(target.appended_ids().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_ingest_keeps_status_pending() {
        let (_dir, pool) = temp_store().await;
        let mut source = loops_source().with_playlist(
            "pl-2",
            "Broken",
            vec![source_track("D", "Delta", &["Band"])],
        );
        source.failing_playlists.push("pl-2".to_string());
        let target = MockTarget::new();

        let playlists = source.list_playlists().await.unwrap();
        let report = orchestrator(&source, &target, &pool)
            .run(&playlists)
            .await
            .unwrap();

        assert_eq!(report.playlists_ingested, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].playlist, "Broken");
        // Replication must not start from a half-mirrored state
        assert_eq!(target.created_count(), 0);
        assert_eq!(
            store::transfer_status(&pool).await.unwrap(),
            TransferStatus::IngestPending
        );
    }

    #[tokio::test]
    async fn test_partial_resolution_still_replicates() {
        let (_dir, pool) = temp_store().await;
        let source = loops_source();
        let target = MockTarget::new();
        // Beta finds nothing; Alpha and Gamma hit
        target.on_search_hit("Alpha Band", "vid-a", "Alpha", "Band");
        target.on_search_hit("Gamma Band", "vid-c", "Gamma", "Band");

        let playlists = source.list_playlists().await.unwrap();
        let report = orchestrator(&source, &target, &pool)
            .run(&playlists)
            .await
            .unwrap();

        assert_eq!(report.tracks_matched, 2);
        assert_eq!(report.tracks_unmatched, 1);
        // The playlist still went out with the matches that succeeded
        assert_eq!(target.appended_ids(), vec!["vid-a", "vid-a", "vid-c"]);
        // No-match is settled, so the playlist counts as replicated
        assert_eq!(report.playlists_replicated, 1);
    }

    #[tokio::test]
    async fn test_no_match_verdict_not_researched_on_rerun() {
        let (_dir, pool) = temp_store().await;
        let source = loops_source();
        let target = MockTarget::new();
        // Beta finds nothing (settled no-match); Alpha keeps failing so
        // the playlist stays retriable into the second run
        target.on_search_hit("Gamma Band", "vid-c", "Gamma", "Band");
        for _ in 0..4 {
            target.on_search(
                "Alpha Band",
                Err(crate::catalog::domain::CatalogError::Network(
                    "down".to_string(),
                )),
            );
        }

        let playlists = source.list_playlists().await.unwrap();
        let orchestrator = orchestrator(&source, &target, &pool);
        let report = orchestrator.run(&playlists).await.unwrap();
        assert_eq!(report.playlists_partial, 1);

        target.on_search_hit("Alpha Band", "vid-a", "Alpha", "Band");
        let report = orchestrator.run(&playlists).await.unwrap();
        assert_eq!(report.playlists_replicated, 1);

        // Beta was searched exactly once; its no-match verdict held
        assert_eq!(target.search_count("Beta Band"), 1);
    }

    #[tokio::test]
    async fn test_search_failure_leaves_playlist_retriable() {
        let (_dir, pool) = temp_store().await;
        let source = loops_source();
        let target = MockTarget::new();
        target.on_search_hit("Alpha Band", "vid-a", "Alpha", "Band");
        target.on_search_hit("Gamma Band", "vid-c", "Gamma", "Band");
        // Beta's search fails on every attempt this run
        for _ in 0..4 {
            target.on_search(
                "Beta Band",
                Err(crate::catalog::domain::CatalogError::Network(
                    "down".to_string(),
                )),
            );
        }

        let playlists = source.list_playlists().await.unwrap();
        let orchestrator = orchestrator(&source, &target, &pool);
        let report = orchestrator.run(&playlists).await.unwrap();
        assert_eq!(report.playlists_partial, 1);

        // Next run retries only Beta and completes the playlist
        target.on_search_hit("Beta Band", "vid-b", "Beta", "Band");
        let report = orchestrator.run(&playlists).await.unwrap();
        assert_eq!(report.playlists_replicated, 1);
        assert_eq!(report.tracks_matched, 1);
        assert_eq!(target.created_count(), 1);
        // Membership got replayed again (at-least-once), now gap-free
        let last_append: Vec<String> = target.appended_ids();
        assert!(last_append.ends_with(&[
            "vid-a".to_string(),
            "vid-b".to_string(),
            "vid-a".to_string(),
            "vid-c".to_string()
        ]));
    }

    #[tokio::test]
    async fn test_playlist_added_after_first_transfer_is_linked_once() {
        let (_dir, pool) = temp_store().await;
        let source = loops_source();
        let target = MockTarget::new();
        script_all_hits(&target);

        let playlists = source.list_playlists().await.unwrap();
        orchestrator(&source, &target, &pool)
            .run(&playlists)
            .await
            .unwrap();
        assert_eq!(target.created_count(), 1);

        // The source grows a playlist after the first transfer finished
        let source = loops_source().with_playlist(
            "pl-2",
            "Later",
            vec![source_track("D", "Delta", &["Band"])],
        );
        target.on_search_hit("Delta Band", "vid-d", "Delta", "Band");
        let playlists = source.list_playlists().await.unwrap();
        let orchestrator = orchestrator(&source, &target, &pool);

        let report = orchestrator.run(&playlists).await.unwrap();
        assert!(report.clean(), "failures: {:?}", report.failures);
        assert_eq!(report.playlists_ingested, 1);
        assert_eq!(report.already_done, 1);
        assert_eq!(report.playlists_replicated, 1);
        assert_eq!(target.created_count(), 2);

        // A third run sees both linked and creates nothing new
        let report = orchestrator.run(&playlists).await.unwrap();
        assert_eq!(report.already_done, 2);
        assert_eq!(target.created_count(), 2);
    }

    #[tokio::test]
    async fn test_unsanitizable_playlist_name_is_recorded_failure() {
        let (_dir, pool) = temp_store().await;
        let source = MockSource::new("user-1")
            .with_playlist("pl-bad", "!!!", vec![source_track("A", "Alpha", &["Band"])])
            .with_playlist("pl-ok", "Fine", vec![source_track("B", "Beta", &["Band"])]);
        let target = MockTarget::new();
        target.on_search_hit("Alpha Band", "vid-a", "Alpha", "Band");
        target.on_search_hit("Beta Band", "vid-b", "Beta", "Band");

        let playlists = source.list_playlists().await.unwrap();
        let report = orchestrator(&source, &target, &pool)
            .run(&playlists)
            .await
            .unwrap();

        // The bad playlist fails locally; its sibling still replicates
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.playlists_replicated, 1);
        assert_eq!(target.created_count(), 1);
    }
}
