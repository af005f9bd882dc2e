//! Internal domain models for the source and target catalogs.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All external API responses get converted into these types via adapters.

/// A playlist as listed by the source catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePlaylist {
    /// Opaque id in the source catalog
    pub id: String,
    /// Playlist name
    pub name: String,
    /// Free-text description (empty string from some services)
    pub description: Option<String>,
}

/// An artist reference attached to a source track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRef {
    /// Opaque id in the source catalog
    pub id: String,
    /// Artist name
    pub name: String,
}

/// An album reference attached to a source track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumRef {
    /// Opaque id in the source catalog
    pub id: String,
    /// Album name
    pub name: String,
    /// Release date string as reported (year, year-month, or full date)
    pub release_date: String,
}

/// A track as listed in a source playlist, with its full credit graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTrack {
    /// Opaque id in the source catalog
    pub id: String,
    /// Display name
    pub name: String,
    /// Album this track appears on
    pub album: AlbumRef,
    /// Artists in credit order (at least one for playable tracks)
    pub artists: Vec<ArtistRef>,
}

/// One ranked result from the target catalog's search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    /// Opaque id in the target catalog
    pub id: String,
    /// Candidate title
    pub title: String,
    /// Candidate artist names (may be empty)
    pub artists: Vec<String>,
}

/// Errors that can occur talking to either catalog service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not authenticated with the service")]
    Unauthorized,

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Resource not found: {0}")]
    NotFound(String),
}
