//! YouTube Music bridge HTTP client
//!
//! Talks to a ytmusicapi-compatible HTTP bridge. The bridge wraps the
//! browser-authenticated session; this client sends its access token as
//! a bearer header and never handles the login flow itself.
//!
//! Search queries are URL-encoded by hand so the query string matches
//! what the bridge feeds into ytmusicapi verbatim.

use tracing::debug;

use super::{adapter, dto};
use crate::catalog::domain::{CatalogError, SearchCandidate};

/// YouTube Music bridge client
pub struct YtMusicClient {
    http_client: reqwest::Client,
    base_url: String,
    token: String,
}

impl YtMusicClient {
    /// Create a new client against the given bridge URL
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: trim_trailing_slash(base_url.into()),
            token: token.into(),
        }
    }

    /// Ranked song search. Callers consume only the leading results.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, CatalogError> {
        let url = format!(
            "{}/search?q={}&filter=songs",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let results: Vec<dto::SearchResult> = Self::parse(response).await?;
        debug!(query = query, count = results.len(), "Search returned");
        Ok(adapter::to_candidates(results))
    }

    /// Create a playlist and return its target-side id.
    pub async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: &str,
    ) -> Result<String, CatalogError> {
        let url = format!("{}/playlists", self.base_url);
        let body = dto::CreatePlaylistRequest {
            title,
            description,
            privacy_status: privacy,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let created: dto::CreatePlaylistResponse = Self::parse(response).await?;
        Ok(created.playlist_id)
    }

    /// Append items to a playlist, duplicates allowed.
    ///
    /// Success is batch-level only; the bridge gives no per-item
    /// confirmation we could act on.
    pub async fn add_items(
        &self,
        playlist_id: &str,
        item_ids: &[String],
    ) -> Result<(), CatalogError> {
        let url = format!("{}/playlists/{}/items", self.base_url, playlist_id);
        let body = dto::AddItemsRequest {
            video_ids: item_ids,
            duplicates: true,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let result: dto::AddItemsResponse = Self::parse(response).await?;
        if result.status != "STATUS_SUCCEEDED" {
            return Err(CatalogError::ApiError(format!(
                "add_items reported {}",
                result.status
            )));
        }
        Ok(())
    }

    /// Map the response status and parse the JSON body
    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CatalogError> {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CatalogError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            if let Ok(err) = response.json::<dto::ApiError>().await {
                return Err(CatalogError::ApiError(err.error));
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

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
