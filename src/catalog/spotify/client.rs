//! Spotify HTTP client
//!
//! Handles communication with the Spotify Web API using a pre-obtained
//! bearer token. Obtaining the token (OAuth flow) is outside this crate.
//!
//! Paged endpoints are flattened here: callers always receive the full
//! sequence, never a page envelope.

use serde::de::DeserializeOwned;
use tracing::debug;

use super::{adapter, dto};
use crate::catalog::domain::{CatalogError, SourcePlaylist, SourceTrack};

/// Page size for the playlist index (Spotify maximum is 50)
const PLAYLIST_PAGE_SIZE: u32 = 50;

/// Page size for playlist membership (Spotify maximum is 100)
const TRACK_PAGE_SIZE: u32 = 100;

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    base_url: String,
    token: String,
}

impl SpotifyClient {
    /// Create a new client with the given bearer token
    pub fn new(token: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: "https://api.spotify.com/v1".to_string(),
            token: token.into(),
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Id of the authenticated account (names the per-user store)
    pub async fn current_user_id(&self) -> Result<String, CatalogError> {
        let url = format!("{}/me", self.base_url);
        let me: dto::MeResponse = self.get_json(&url).await?;
        Ok(me.id)
    }

    /// All playlists of the authenticated account, flattened across pages
    pub async fn list_playlists(&self) -> Result<Vec<SourcePlaylist>, CatalogError> {
        let mut playlists = Vec::new();
        let mut offset = 0;

        loop {
            let url = format!(
                "{}/me/playlists?limit={}&offset={}",
                self.base_url, PLAYLIST_PAGE_SIZE, offset
            );
            let page: dto::Page<dto::PlaylistItem> = self.get_json(&url).await?;
            let has_next = page.next.is_some();
            playlists.extend(page.items.into_iter().map(adapter::to_playlist));

            if !has_next {
                break;
            }
            offset += PLAYLIST_PAGE_SIZE;
        }

        debug!(count = playlists.len(), "Fetched playlist index");
        Ok(playlists)
    }

    /// Full membership of one playlist in playback order, flattened
    /// across pages. Local files and removed tracks are skipped.
    pub async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<SourceTrack>, CatalogError> {
        let mut tracks = Vec::new();
        let mut offset = 0;

        loop {
            let url = format!(
                "{}/playlists/{}/tracks?limit={}&offset={}",
                self.base_url, playlist_id, TRACK_PAGE_SIZE, offset
            );
            let page: dto::Page<dto::PlaylistTrackItem> = self.get_json(&url).await?;
            let has_next = page.next.is_some();
            tracks.extend(page.items.into_iter().filter_map(adapter::to_track));

            if !has_next {
                break;
            }
            offset += TRACK_PAGE_SIZE;
        }

        debug!(
            playlist = playlist_id,
            count = tracks.len(),
            "Fetched playlist membership"
        );
        Ok(tracks)
    }

    /// Send an authenticated GET and parse the JSON response
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CatalogError::Unauthorized);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            if let Ok(envelope) = response.json::<dto::ApiErrorResponse>().await {
                return Err(CatalogError::ApiError(envelope.error.message));
            }
            return Err(CatalogError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}
