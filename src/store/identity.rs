//! Match records, playlist links, and search verdicts.
//!
//! This is the durable half of the reconciliation engine: once a track
//! is matched or a playlist is linked, re-runs observe the record and
//! skip the work. Match records are permanent - `record_match` never
//! overwrites an existing resolution with a different target id.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::model::{MembershipSlot, PlaylistLink, UnmatchedTrack};

/// Outcome persisted for a track whose search did not produce a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchVerdict {
    /// Searched successfully, no candidate cleared the threshold.
    /// Not retried on later runs without new information.
    NoMatch,
    /// The search itself failed after all retries. Retried next run.
    SearchFailed,
}

impl MatchVerdict {
    fn as_str(self) -> &'static str {
        match self {
            MatchVerdict::NoMatch => "no_match",
            MatchVerdict::SearchFailed => "search_failed",
        }
    }
}

/// Record a source-track → target-track resolution.
///
/// No-op when a match record already exists for the track, whatever its
/// target id: matches are stable across re-runs. Also clears any
/// earlier search verdict. Unknown source tracks are silently skipped.
pub async fn record_match(
    pool: &SqlitePool,
    source_track_id: &str,
    target_track_id: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO track_matches (track_id, target_track_id, matched_at)
        SELECT id, ?, ? FROM tracks WHERE source_id = ?
        "#,
    )
    .bind(target_track_id)
    .bind(Utc::now().to_rfc3339())
    .bind(source_track_id)
    .execute(pool)
    .await?;

    sqlx::query(
        "DELETE FROM search_verdicts WHERE track_id = (SELECT id FROM tracks WHERE source_id = ?)",
    )
    .bind(source_track_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Persist the outcome of an unsuccessful search for a track.
///
/// Upserts: a `search_failed` verdict can later become `no_match` (or
/// disappear entirely when a match is recorded).
pub async fn record_verdict(
    pool: &SqlitePool,
    source_track_id: &str,
    verdict: MatchVerdict,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO search_verdicts (track_id, verdict, recorded_at)
        SELECT id, ?, ? FROM tracks WHERE source_id = ?
        ON CONFLICT(track_id) DO UPDATE SET
            verdict = excluded.verdict,
            recorded_at = excluded.recorded_at
        "#,
    )
    .bind(verdict.as_str())
    .bind(Utc::now().to_rfc3339())
    .bind(source_track_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Source ids of tracks with a persisted `no_match` verdict.
///
/// These were searched and came up empty; the orchestrator excludes
/// them from re-search instead of retrying indefinitely. Tracks whose
/// search merely failed are not listed and get another chance.
pub async fn no_match_source_ids(pool: &SqlitePool) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT t.source_id
        FROM search_verdicts v
        JOIN tracks t ON t.id = v.track_id
        WHERE v.verdict = 'no_match'
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Tracks in the given playlist with no match record, in playlist order,
/// deduplicated by source id (a track appearing twice is searched once).
pub async fn unmatched_tracks(
    pool: &SqlitePool,
    source_playlist_id: &str,
) -> sqlx::Result<Vec<UnmatchedTrack>> {
    let rows: Vec<(i64, String, String)> = sqlx::query_as(
        r#"
        SELECT t.id, t.source_id, t.name
        FROM playlist_tracks pt
        JOIN playlists p ON p.id = pt.playlist_id
        JOIN tracks t ON t.id = pt.track_id
        WHERE p.source_id = ?
          AND t.id NOT IN (SELECT track_id FROM track_matches)
        GROUP BY t.id
        ORDER BY MIN(pt.position)
        "#,
    )
    .bind(source_playlist_id)
    .fetch_all(pool)
    .await?;

    let mut tracks = Vec::with_capacity(rows.len());
    for (track_id, source_id, name) in rows {
        let artists: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT a.name
            FROM track_artists ta
            JOIN artists a ON a.id = ta.artist_id
            WHERE ta.track_id = ?
            ORDER BY ta.ordinal
            "#,
        )
        .bind(track_id)
        .fetch_all(pool)
        .await?;

        tracks.push(UnmatchedTrack {
            source_id,
            name,
            artists: artists.into_iter().map(|(n,)| n).collect(),
        });
    }
    Ok(tracks)
}

/// The playlist's ordered membership with each slot's matched target id.
///
/// Slots whose track still lacks a match surface as `None` - explicit
/// gaps, so callers can tell "fully resolved" from "partially resolved"
/// without losing sequence positions.
pub async fn matched_targets(
    pool: &SqlitePool,
    source_playlist_id: &str,
) -> sqlx::Result<Vec<MembershipSlot>> {
    sqlx::query_as::<_, MembershipSlot>(
        r#"
        SELECT pt.position, m.target_track_id
        FROM playlist_tracks pt
        JOIN playlists p ON p.id = pt.playlist_id
        LEFT JOIN track_matches m ON m.track_id = pt.track_id
        WHERE p.source_id = ?
        ORDER BY pt.position
        "#,
    )
    .bind(source_playlist_id)
    .fetch_all(pool)
    .await
}

/// Link a source playlist to its created target playlist.
///
/// At most one link per playlist. Errors with `RowNotFound` when the
/// link was not written, either because the playlist was never mirrored
/// or because a link already exists; the caller created a remote
/// playlist it believes is fresh, so a silent no-op would lose it.
pub async fn mark_playlist_linked(
    pool: &SqlitePool,
    source_playlist_id: &str,
    target_playlist_id: &str,
) -> sqlx::Result<()> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO playlist_links (playlist_id, target_playlist_id, done, linked_at)
        SELECT id, ?, 0, ? FROM playlists WHERE source_id = ?
        "#,
    )
    .bind(target_playlist_id)
    .bind(Utc::now().to_rfc3339())
    .bind(source_playlist_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

/// Look up the playlist's link record, if any.
pub async fn playlist_link(
    pool: &SqlitePool,
    source_playlist_id: &str,
) -> sqlx::Result<Option<PlaylistLink>> {
    sqlx::query_as::<_, PlaylistLink>(
        r#"
        SELECT l.target_playlist_id, l.done
        FROM playlist_links l
        JOIN playlists p ON p.id = l.playlist_id
        WHERE p.source_id = ?
        "#,
    )
    .bind(source_playlist_id)
    .fetch_optional(pool)
    .await
}

/// Flip the playlist's done flag once membership replication completed.
pub async fn mark_playlist_done(
    pool: &SqlitePool,
    source_playlist_id: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE playlist_links SET done = 1
        WHERE playlist_id = (SELECT id FROM playlists WHERE source_id = ?)
        "#,
    )
    .bind(source_playlist_id)
    .execute(pool)
    .await?;
    Ok(())
}
