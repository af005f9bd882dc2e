//! Core data models for the mirrored catalog.
//!
//! Row types the reconciliation reads back out of the per-user store.
//! The mirror's write path binds plain tuples; only rows with a read
//! path get a struct here.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `playlists` (plus `tracks` / `albums` / `artists`) - source catalog mirror
//! - `track_matches` - confirmed source-track → target-track resolutions
//! - `playlist_links` - source-playlist → target-playlist with a done flag
//! - `search_verdicts` - per-track outcome of an unsuccessful search

use sqlx::FromRow;

/// A mirrored source playlist.
#[derive(Debug, Clone, FromRow)]
pub struct Playlist {
    /// Database ID (auto-generated surrogate)
    pub id: i64,
    /// Opaque playlist id in the source catalog (unique)
    pub source_id: String,
    /// Playlist name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
}

/// Link between a source playlist and its created target playlist.
#[derive(Debug, Clone, FromRow)]
pub struct PlaylistLink {
    /// Opaque playlist id in the target catalog
    pub target_playlist_id: String,
    /// Whether membership replication has completed
    pub done: bool,
}

/// One slot of a playlist's ordered membership after matching.
///
/// `target_track_id` is `None` when the track at this position has no
/// match record yet - an explicit gap, so callers can tell a fully
/// resolved playlist from a partially resolved one.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipSlot {
    /// Zero-based position within the playlist
    pub position: i64,
    /// Matched target track id, or `None` for an unresolved gap
    pub target_track_id: Option<String>,
}

/// A track that still needs resolution against the target catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedTrack {
    /// Opaque track id in the source catalog
    pub source_id: String,
    /// Display name
    pub name: String,
    /// Artist names in source credit order
    pub artists: Vec<String>,
}

/// Process-wide transfer phase, persisted in the `status` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// Source playlists still need to be mirrored locally.
    IngestPending,
    /// The mirror is complete; replication can proceed.
    IngestComplete,
}

impl TransferStatus {
    /// Integer form stored in the database.
    pub fn as_i64(self) -> i64 {
        match self {
            TransferStatus::IngestPending => 1,
            TransferStatus::IngestComplete => 2,
        }
    }

    /// Parse the stored integer form. Unknown values fall back to
    /// `IngestPending` so a corrupted flag re-runs ingestion (idempotent).
    pub fn from_i64(value: i64) -> Self {
        match value {
            2 => TransferStatus::IngestComplete,
            _ => TransferStatus::IngestPending,
        }
    }
}
