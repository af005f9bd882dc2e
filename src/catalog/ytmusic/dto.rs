//! YouTube Music bridge Data Transfer Objects
//!
//! These types match EXACTLY what the ytmusicapi-compatible bridge
//! returns. DO NOT add fields that aren't in the response.
//! DO NOT use these types outside the ytmusic module - convert to domain types.
//!
//! The search shape mirrors ytmusicapi's `search(..., filter="songs")`
//! result entries; playlist endpoints wrap its `create_playlist` /
//! `add_playlist_items` return values.

use serde::{Deserialize, Serialize};

/// One entry from GET /search?filter=songs
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Video id, the target-side track identity
    pub video_id: String,
    /// Song title
    pub title: String,
    /// Credited artists (may be empty for auto-generated entries)
    #[serde(default)]
    pub artists: Vec<SearchArtist>,
}

/// Artist attached to a search result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchArtist {
    /// Artist name
    pub name: String,
    /// Channel id (absent for some credits)
    pub id: Option<String>,
}

/// Request body for POST /playlists
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistRequest<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub privacy_status: &'a str,
}

/// Response from POST /playlists
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistResponse {
    /// Id of the new playlist
    pub playlist_id: String,
}

/// Request body for POST /playlists/{id}/items
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemsRequest<'a> {
    pub video_ids: &'a [String],
    /// Always true: membership replay must preserve duplicate tracks
    pub duplicates: bool,
}

/// Response from POST /playlists/{id}/items
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddItemsResponse {
    /// "STATUS_SUCCEEDED" on success
    pub status: String,
}

/// Error envelope returned on non-2xx responses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the bridge returns.
// If these fail, the bridge has changed and we need to update our DTOs.
// ============================================================================
