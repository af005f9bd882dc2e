//! Spotify Web API Data Transfer Objects
//!
//! These types match EXACTLY what the Spotify API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the spotify module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api
//!
//! We use /me for the account id, /me/playlists for the playlist index,
//! and /playlists/{id}/tracks for membership. Paged endpoints share the
//! same envelope shape ([`Page`]).

use serde::{Deserialize, Serialize};

/// Response from GET /me
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MeResponse {
    /// Spotify user id
    pub id: String,
    /// Display name (may be absent)
    pub display_name: Option<String>,
}

/// Paging envelope shared by all list endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    /// Items on this page
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// URL of the next page, absent on the last page
    pub next: Option<String>,
    /// Total item count across all pages
    pub total: Option<u32>,
}

/// One playlist from GET /me/playlists
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistItem {
    /// Spotify playlist id
    pub id: String,
    /// Playlist name
    pub name: String,
    /// Description ("" for playlists without one)
    pub description: Option<String>,
}

/// One entry from GET /playlists/{id}/tracks
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistTrackItem {
    /// The track, null for removed/unavailable entries
    pub track: Option<TrackObject>,
    /// True for locally-imported files (no catalog id)
    #[serde(default)]
    pub is_local: bool,
}

/// Full track object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackObject {
    /// Spotify track id, null for local files
    pub id: Option<String>,
    /// Track name
    pub name: String,
    /// The album this track appears on
    pub album: AlbumObject,
    /// Artists in credit order
    #[serde(default)]
    pub artists: Vec<ArtistObject>,
}

/// Simplified album object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlbumObject {
    /// Spotify album id, null for local files
    pub id: Option<String>,
    /// Album name
    pub name: String,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub release_date: Option<String>,
}

/// Simplified artist object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistObject {
    /// Spotify artist id, null for local files
    pub id: Option<String>,
    /// Artist name
    pub name: String,
}

/// Error envelope returned on non-2xx responses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

/// Error payload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================
