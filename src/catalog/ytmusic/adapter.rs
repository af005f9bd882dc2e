//! Adapter layer: Convert YouTube Music bridge DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.

use super::dto;
use crate::catalog::domain::SearchCandidate;

/// Convert bridge search results to domain candidates, keeping rank order.
pub fn to_candidates(results: Vec<dto::SearchResult>) -> Vec<SearchCandidate> {
    results
        .into_iter()
        .map(|r| SearchCandidate {
            id: r.video_id,
            title: r.title,
            artists: r.artists.into_iter().map(|a| a.name).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_candidates_preserves_order_and_names() {
        let results = vec![
            dto::SearchResult {
                video_id: "v1".to_string(),
                title: "First".to_string(),
                artists: vec![dto::SearchArtist {
                    name: "Band".to_string(),
                    id: None,
                }],
            },
            dto::SearchResult {
                video_id: "v2".to_string(),
                title: "Second".to_string(),
                artists: vec![],
            },
        ];

        let candidates = to_candidates(results);
        assert_eq!(candidates[0].id, "v1");
        assert_eq!(candidates[0].artists, vec!["Band"]);
        assert_eq!(candidates[1].id, "v2");
        assert!(candidates[1].artists.is_empty());
    }
}
