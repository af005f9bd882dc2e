//! Idempotent batch ingestion into the catalog mirror.
//!
//! Every operation here is an `INSERT OR IGNORE` run inside one
//! transaction per batch: a unique-constraint hit is the expected signal
//! that the row already exists, never an error. Re-ingesting the same
//! playlist therefore changes nothing - the property the resumable
//! orchestrator depends on.
//!
//! Junction rows resolve their surrogate ids through subselects on the
//! source ids; a row referencing an unknown parent is silently skipped,
//! consistent with the ignore-on-conflict policy.
//!
//! No network I/O happens here.

use sqlx::SqlitePool;

use crate::catalog::domain::SourcePlaylist;

/// Mirror a batch of source playlists.
pub async fn ingest_playlists(pool: &SqlitePool, rows: &[SourcePlaylist]) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for playlist in rows {
        sqlx::query(
            "INSERT OR IGNORE INTO playlists (source_id, name, description) VALUES (?, ?, ?)",
        )
        .bind(&playlist.id)
        .bind(&playlist.name)
        .bind(&playlist.description)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

/// Mirror a batch of source tracks as `(source_id, name)` pairs.
pub async fn ingest_tracks(pool: &SqlitePool, rows: &[(String, String)]) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for (source_id, name) in rows {
        sqlx::query("INSERT OR IGNORE INTO tracks (source_id, name) VALUES (?, ?)")
            .bind(source_id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await
}

/// Mirror a batch of albums as `(source_id, name, release_date)` tuples.
pub async fn ingest_albums(
    pool: &SqlitePool,
    rows: &[(String, String, String)],
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for (source_id, name, release_date) in rows {
        sqlx::query(
            "INSERT OR IGNORE INTO albums (source_id, name, release_date) VALUES (?, ?, ?)",
        )
        .bind(source_id)
        .bind(name)
        .bind(release_date)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

/// Mirror a batch of artists as `(source_id, name)` pairs.
pub async fn ingest_artists(pool: &SqlitePool, rows: &[(String, String)]) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for (source_id, name) in rows {
        sqlx::query("INSERT OR IGNORE INTO artists (source_id, name) VALUES (?, ?)")
            .bind(source_id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await
}

/// Mirror track↔artist credits as `(track_source_id, artist_source_id,
/// ordinal)` tuples. The ordinal preserves source crediting order; the
/// junction key stays (track, artist), so re-ingestion is a no-op.
pub async fn ingest_artist_credits(
    pool: &SqlitePool,
    rows: &[(String, String, i64)],
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for (track_source_id, artist_source_id, ordinal) in rows {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO track_artists (track_id, artist_id, ordinal)
            SELECT t.id, a.id, ?
            FROM tracks t
            JOIN artists a ON a.source_id = ?
            WHERE t.source_id = ?
            "#,
        )
        .bind(ordinal)
        .bind(artist_source_id)
        .bind(track_source_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

/// Mirror track↔album credits as `(track_source_id, album_source_id)` pairs.
pub async fn ingest_album_credits(
    pool: &SqlitePool,
    rows: &[(String, String)],
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for (track_source_id, album_source_id) in rows {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO track_albums (track_id, album_id)
            SELECT t.id, al.id
            FROM tracks t
            JOIN albums al ON al.source_id = ?
            WHERE t.source_id = ?
            "#,
        )
        .bind(album_source_id)
        .bind(track_source_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

/// Mirror a playlist's ordered membership.
///
/// `track_source_ids` is the playlist in playback order; sequence
/// numbers are assigned dense and zero-based from it, here, once. The
/// same track may legally appear at several positions. Re-submitting
/// the same membership hits the (playlist, position) key and is ignored,
/// so positions are never renumbered.
pub async fn ingest_membership(
    pool: &SqlitePool,
    playlist_source_id: &str,
    track_source_ids: &[String],
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for (position, track_source_id) in track_source_ids.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO playlist_tracks (playlist_id, track_id, position)
            SELECT p.id, t.id, ?
            FROM playlists p
            JOIN tracks t ON t.source_id = ?
            WHERE p.source_id = ?
            "#,
        )
        .bind(position as i64)
        .bind(track_source_id)
        .bind(playlist_source_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

/// Mirror accepted target tracks as `(target_id, name)` pairs.
pub async fn ingest_target_tracks(
    pool: &SqlitePool,
    rows: &[(String, String)],
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for (target_id, name) in rows {
        sqlx::query("INSERT OR IGNORE INTO target_tracks (target_id, name) VALUES (?, ?)")
            .bind(target_id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await
}

/// Mirror created target playlists.
pub async fn ingest_target_playlists(pool: &SqlitePool, target_ids: &[String]) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for target_id in target_ids {
        sqlx::query("INSERT OR IGNORE INTO target_playlists (target_id) VALUES (?)")
            .bind(target_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await
}
