//! Candidate scoring for track resolution.
//!
//! Pure functions: no I/O, no state. A candidate's score is the
//! arithmetic mean of its title similarity and its best artist
//! similarity, both normalized string similarities over lower-cased
//! input. Acceptance requires the score to strictly exceed
//! [`ACCEPT_THRESHOLD`].

use crate::catalog::domain::SearchCandidate;

/// Minimum combined similarity a candidate must strictly exceed.
pub const ACCEPT_THRESHOLD: f64 = 0.6;

/// Normalized similarity of two strings, case-insensitive, in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Best pairwise similarity between any query artist and any candidate
/// artist. A candidate listing no artists scores 0.
pub fn artist_similarity(query_artists: &[String], candidate_artists: &[String]) -> f64 {
    query_artists
        .iter()
        .flat_map(|q| candidate_artists.iter().map(move |c| similarity(q, c)))
        .fold(0.0, f64::max)
}

/// Combined score for one candidate against the query track.
pub fn score_candidate(name: &str, artists: &[String], candidate: &SearchCandidate) -> f64 {
    let name_similarity = similarity(name, &candidate.title);
    let artist_similarity = artist_similarity(artists, &candidate.artists);
    (name_similarity + artist_similarity) / 2.0
}

/// Highest-scoring candidate with its score.
pub fn best_candidate<'a>(
    name: &str,
    artists: &[String],
    candidates: &'a [SearchCandidate],
) -> Option<(&'a SearchCandidate, f64)> {
    let mut best: Option<(&SearchCandidate, f64)> = None;
    for candidate in candidates {
        let score = score_candidate(name, artists, candidate);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((candidate, score));
        }
    }
    best
}

/// Whether a score clears the acceptance threshold (strictly greater).
pub fn accepts(score: f64) -> bool {
    score > ACCEPT_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, title: &str, artists: &[&str]) -> SearchCandidate {
        SearchCandidate {
            id: id.to_string(),
            title: title.to_string(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_similarity_is_case_insensitive() {
        assert_eq!(similarity("Highway Star", "highway star"), 1.0);
    }

    #[test]
    fn test_artist_similarity_takes_maximum_pair() {
        let query = vec!["Deep Purple".to_string(), "Unknown Guest".to_string()];
        let candidate = vec!["Some Tribute Band".to_string(), "Deep Purple".to_string()];
        assert_eq!(artist_similarity(&query, &candidate), 1.0);
    }

    #[test]
    fn test_candidate_without_artists_scores_zero_on_artists() {
        let query = vec!["Deep Purple".to_string()];
        assert_eq!(artist_similarity(&query, &[]), 0.0);

        // Perfect title, no artists: mean is 0.5, below threshold
        let c = candidate("v1", "Highway Star", &[]);
        let score = score_candidate("Highway Star", &query, &c);
        assert_eq!(score, 0.5);
        assert!(!accepts(score));
    }

    #[test]
    fn test_threshold_is_strict() {
        // name 1.0, artist 0.2 → mean exactly 0.6: rejected
        assert!(!accepts((1.0 + 0.2) / 2.0));
        // mean 0.61: accepted
        assert!(accepts(0.61));
    }

    #[test]
    fn test_best_candidate_prefers_higher_score() {
        let query_artists = vec!["Deep Purple".to_string()];
        let candidates = vec![
            candidate("v1", "Highway Star (Karaoke Version)", &["Karaoke Crew"]),
            candidate("v2", "Highway Star", &["Deep Purple"]),
            candidate("v3", "Space Truckin'", &["Deep Purple"]),
        ];

        let (best, score) = best_candidate("Highway Star", &query_artists, &candidates).unwrap();
        assert_eq!(best.id, "v2");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_best_candidate_empty_input() {
        assert!(best_candidate("x", &[], &[]).is_none());
    }
}
