//! Per-user persistence for the catalog mirror and reconciliation state.
//!
//! Uses SQLx with SQLite, one database file per source account. The pool
//! is capped at a single connection: every read and write serializes
//! through it, which protects SQLite's single-writer constraint across
//! concurrent ingestion tasks. All mutations are idempotent, so the lock
//! only affects throughput, never correctness.
//!
//! Submodules:
//! - [`mirror`] - idempotent batch ingestion of source catalog data
//! - [`identity`] - match records, playlist links, and search verdicts
//!
//! # Example
//!
//! ```ignore
//! use playlist_porter::store;
//!
//! let pool = store::open(&dir, "spotify-user-id").await?;
//! let status = store::transfer_status(&pool).await?;
//! ```

pub mod identity;
pub mod mirror;

use std::path::Path;

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::model::TransferStatus;

/// Schema for the per-user store.
///
/// Databases are created per user at runtime, so the schema lives inline
/// as idempotent DDL instead of in a migrations directory. Junction
/// tables key on surrogate ids; every unique constraint doubles as the
/// ignore-on-conflict guard for re-ingestion.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS status (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    phase INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS playlists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS tracks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS albums (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    release_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS artists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS track_artists (
    track_id INTEGER NOT NULL,
    artist_id INTEGER NOT NULL,
    ordinal INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (track_id, artist_id),
    FOREIGN KEY (track_id) REFERENCES tracks(id),
    FOREIGN KEY (artist_id) REFERENCES artists(id)
);

CREATE TABLE IF NOT EXISTS track_albums (
    track_id INTEGER NOT NULL,
    album_id INTEGER NOT NULL,
    PRIMARY KEY (track_id, album_id),
    FOREIGN KEY (track_id) REFERENCES tracks(id),
    FOREIGN KEY (album_id) REFERENCES albums(id)
);

CREATE TABLE IF NOT EXISTS playlist_tracks (
    playlist_id INTEGER NOT NULL,
    track_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (playlist_id, position),
    FOREIGN KEY (playlist_id) REFERENCES playlists(id),
    FOREIGN KEY (track_id) REFERENCES tracks(id)
);

CREATE TABLE IF NOT EXISTS target_tracks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    target_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS target_playlists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    target_id TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS track_matches (
    track_id INTEGER PRIMARY KEY,
    target_track_id TEXT NOT NULL,
    matched_at TEXT NOT NULL,
    FOREIGN KEY (track_id) REFERENCES tracks(id)
);

CREATE TABLE IF NOT EXISTS playlist_links (
    playlist_id INTEGER PRIMARY KEY,
    target_playlist_id TEXT NOT NULL,
    done INTEGER NOT NULL DEFAULT 0,
    linked_at TEXT NOT NULL,
    FOREIGN KEY (playlist_id) REFERENCES playlists(id)
);

CREATE TABLE IF NOT EXISTS search_verdicts (
    track_id INTEGER PRIMARY KEY,
    verdict TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    FOREIGN KEY (track_id) REFERENCES tracks(id)
);
"#;

/// Build the SQLite URL for a user's store under the given directory.
pub fn db_url(dir: &Path, user_id: &str) -> String {
    format!("sqlite:{}", dir.join(format!("{user_id}.db")).display())
}

/// Open (creating if necessary) the store for one user.
///
/// Creates the directory and database file on first use, applies the
/// schema, and seeds the transfer status to `ingest-pending`. Safe to
/// call on an existing store: all DDL is `IF NOT EXISTS`.
pub async fn open(dir: &Path, user_id: &str) -> Result<SqlitePool, sqlx::Error> {
    std::fs::create_dir_all(dir).map_err(sqlx::Error::Io)?;
    let url = db_url(dir, user_id);

    if !sqlx::Sqlite::database_exists(&url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(&url).await?;
    }

    // One connection: the coarse per-file lock that serializes all
    // store access across concurrent ingestion tasks.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await?;

    sqlx::raw_sql(SCHEMA).execute(&pool).await?;
    sqlx::query("INSERT OR IGNORE INTO status (id, phase) VALUES (1, ?)")
        .bind(TransferStatus::IngestPending.as_i64())
        .execute(&pool)
        .await?;

    Ok(pool)
}

/// Read the process-wide transfer status flag.
pub async fn transfer_status(pool: &SqlitePool) -> sqlx::Result<TransferStatus> {
    let row: (i64,) = sqlx::query_as("SELECT phase FROM status WHERE id = 1")
        .fetch_one(pool)
        .await?;
    Ok(TransferStatus::from_i64(row.0))
}

/// Persist the transfer status flag.
pub async fn set_transfer_status(
    pool: &SqlitePool,
    status: TransferStatus,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE status SET phase = ? WHERE id = 1")
        .bind(status.as_i64())
        .execute(pool)
        .await?;
    Ok(())
}

/// Mirrored playlists in ingestion order, for progress reporting.
pub async fn mirrored_playlists(pool: &SqlitePool) -> sqlx::Result<Vec<crate::model::Playlist>> {
    sqlx::query_as::<_, crate::model::Playlist>(
        "SELECT id, source_id, name, description FROM playlists ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

/// Counts summarizing the persisted reconciliation state.
#[derive(Debug, Clone)]
pub struct StoreSummary {
    pub status: TransferStatus,
    pub playlists: i64,
    pub tracks: i64,
    pub matches: i64,
    pub no_match: i64,
    pub linked: i64,
    pub replicated: i64,
}

/// Gather summary counts for the `status` subcommand.
pub async fn summary(pool: &SqlitePool) -> sqlx::Result<StoreSummary> {
    async fn count(pool: &SqlitePool, sql: &str) -> sqlx::Result<i64> {
        let row: (i64,) = sqlx::query_as(sql).fetch_one(pool).await?;
        Ok(row.0)
    }

    Ok(StoreSummary {
        status: transfer_status(pool).await?,
        playlists: count(pool, "SELECT COUNT(*) FROM playlists").await?,
        tracks: count(pool, "SELECT COUNT(*) FROM tracks").await?,
        matches: count(pool, "SELECT COUNT(*) FROM track_matches").await?,
        no_match: count(
            pool,
            "SELECT COUNT(*) FROM search_verdicts WHERE verdict = 'no_match'",
        )
        .await?,
        linked: count(pool, "SELECT COUNT(*) FROM playlist_links").await?,
        replicated: count(pool, "SELECT COUNT(*) FROM playlist_links WHERE done = 1").await?,
    })
}
