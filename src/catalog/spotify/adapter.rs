//! Adapter layer: Convert Spotify DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if Spotify changes their response format,
//! only this file and dto.rs need to change.

use super::dto;
use crate::catalog::domain::{AlbumRef, ArtistRef, SourcePlaylist, SourceTrack};

/// Convert a playlist index item to a domain playlist.
///
/// Spotify reports a missing description as the empty string; normalize
/// that to `None`.
pub fn to_playlist(item: dto::PlaylistItem) -> SourcePlaylist {
    SourcePlaylist {
        id: item.id,
        name: item.name,
        description: item.description.filter(|d| !d.is_empty()),
    }
}

/// Convert one membership entry to a domain track.
///
/// Returns `None` for entries the reconciliation cannot use: removed
/// tracks (null track object), local files, and anything else without a
/// catalog id for the track or its album.
pub fn to_track(item: dto::PlaylistTrackItem) -> Option<SourceTrack> {
    if item.is_local {
        return None;
    }
    let track = item.track?;
    let track_id = track.id?;
    let album_id = track.album.id?;

    let artists = track
        .artists
        .into_iter()
        .filter_map(|a| {
            Some(ArtistRef {
                id: a.id?,
                name: a.name,
            })
        })
        .collect();

    Some(SourceTrack {
        id: track_id,
        name: track.name,
        album: AlbumRef {
            id: album_id,
            name: track.album.name,
            release_date: track.album.release_date.unwrap_or_default(),
        },
        artists,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playable_item() -> dto::PlaylistTrackItem {
        dto::PlaylistTrackItem {
            is_local: false,
            track: Some(dto::TrackObject {
                id: Some("track-1".to_string()),
                name: "Song".to_string(),
                album: dto::AlbumObject {
                    id: Some("album-1".to_string()),
                    name: "Album".to_string(),
                    release_date: Some("1999".to_string()),
                },
                artists: vec![dto::ArtistObject {
                    id: Some("artist-1".to_string()),
                    name: "Band".to_string(),
                }],
            }),
        }
    }

    #[test]
    fn test_playable_track_converts() {
        let track = to_track(playable_item()).unwrap();
        assert_eq!(track.id, "track-1");
        assert_eq!(track.album.release_date, "1999");
        assert_eq!(track.artists.len(), 1);
    }

    #[test]
    fn test_local_track_is_skipped() {
        let mut item = playable_item();
        item.is_local = true;
        assert!(to_track(item).is_none());
    }

    #[test]
    fn test_null_track_is_skipped() {
        let item = dto::PlaylistTrackItem {
            is_local: false,
            track: None,
        };
        assert!(to_track(item).is_none());
    }

    #[test]
    fn test_track_without_id_is_skipped() {
        let mut item = playable_item();
        item.track.as_mut().unwrap().id = None;
        assert!(to_track(item).is_none());
    }

    #[test]
    fn test_artist_without_id_is_dropped_from_credits() {
        let mut item = playable_item();
        item.track.as_mut().unwrap().artists.push(dto::ArtistObject {
            id: None,
            name: "Uncredited".to_string(),
        });
        let track = to_track(item).unwrap();
        assert_eq!(track.artists.len(), 1);
    }

    #[test]
    fn test_empty_description_becomes_none() {
        let playlist = to_playlist(dto::PlaylistItem {
            id: "pl-1".to_string(),
            name: "Mix".to_string(),
            description: Some(String::new()),
        });
        assert!(playlist.description.is_none());
    }
}
