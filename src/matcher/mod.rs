//! Track resolution against the target catalog.
//!
//! The matcher turns a (name, artists) pair into a target track id, or
//! decides that no acceptable candidate exists. Search is fuzzy: the
//! top-ranked results are scored (see [`score`]) and the best one is
//! accepted only when it strictly clears the threshold.
//!
//! Transient search failures are retried with linear backoff (base
//! delay × attempt number). After the ceiling, the track becomes a
//! recorded failure - never fatal to the batch. Callers can always
//! distinguish "searched, no match" from "search failed" from "not yet
//! searched".

pub mod score;

use std::time::Duration;

use tracing::{error, info, warn};

use crate::catalog::domain::{CatalogError, SearchCandidate};
use crate::catalog::traits::TargetCatalog;
use crate::model::UnmatchedTrack;
use score::{accepts, best_candidate};

/// How many ranked search results are considered per track.
pub const TOP_CANDIDATES: usize = 3;

/// Tunables for retry, pacing, and batching.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Retry ceiling for a failing search
    pub max_retries: u32,
    /// Base backoff delay; the nth retry waits `retry_delay * n`
    pub retry_delay: Duration,
    /// Pause after every individual search (implicit rate limit)
    pub search_pause: Duration,
    /// Tracks per batch
    pub batch_size: usize,
    /// Longer pause between batches
    pub batch_pause: Duration,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
            search_pause: Duration::from_millis(500),
            batch_size: 5,
            batch_pause: Duration::from_secs(2),
        }
    }
}

impl MatcherConfig {
    /// Zero-delay config so tests don't sleep.
    #[cfg(test)]
    pub fn fast() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::ZERO,
            search_pause: Duration::ZERO,
            batch_size: 5,
            batch_pause: Duration::ZERO,
        }
    }
}

/// Why a track could not be resolved.
#[derive(Debug, Clone)]
pub enum MatchFailure {
    /// Search succeeded; no candidate cleared the threshold.
    NoMatch,
    /// Search kept failing past the retry ceiling.
    SearchFailed(CatalogError),
}

/// A track the batch could not resolve, with the reason.
#[derive(Debug, Clone)]
pub struct FailedTrack {
    pub source_id: String,
    pub name: String,
    pub failure: MatchFailure,
}

/// Disjoint outputs of a batch resolution.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// (target_id, name) pairs for the target-side mirror
    pub accepted: Vec<(String, String)>,
    /// (source_id, target_id) pairs for the identity store
    pub mappings: Vec<(String, String)>,
    /// Tracks that stayed unresolved
    pub failed: Vec<FailedTrack>,
}

impl BatchOutcome {
    /// Every input track lands in exactly one output.
    pub fn total(&self) -> usize {
        self.mappings.len() + self.failed.len()
    }
}

/// Resolves tracks against a [`TargetCatalog`].
pub struct Matcher<'a, T: TargetCatalog> {
    target: &'a T,
    config: MatcherConfig,
}

impl<'a, T: TargetCatalog> Matcher<'a, T> {
    pub fn new(target: &'a T, config: MatcherConfig) -> Self {
        Self { target, config }
    }

    /// Search query: track name and artist names joined by spaces.
    pub fn build_query(name: &str, artists: &[String]) -> String {
        let mut query = name.to_string();
        for artist in artists {
            query.push(' ');
            query.push_str(artist);
        }
        query
    }

    /// Resolve one track. `Ok(None)` means the search succeeded but no
    /// candidate cleared the threshold.
    pub async fn resolve(
        &self,
        name: &str,
        artists: &[String],
    ) -> Result<Option<String>, CatalogError> {
        let query = Self::build_query(name, artists);
        let candidates = self.search_with_retry(&query).await?;
        let top = &candidates[..candidates.len().min(TOP_CANDIDATES)];

        match best_candidate(name, artists, top) {
            Some((candidate, score)) if accepts(score) => {
                info!(
                    track = name,
                    target = %candidate.id,
                    score = format!("{score:.3}"),
                    "Accepted match"
                );
                Ok(Some(candidate.id.clone()))
            }
            _ => Ok(None),
        }
    }

    /// Resolve an ordered batch, pausing briefly between searches and
    /// more substantially between batches. Failures never escape; they
    /// come back in [`BatchOutcome::failed`].
    pub async fn resolve_batch(&self, tracks: &[UnmatchedTrack]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let chunk_size = self.config.batch_size.max(1);
        let chunks: Vec<&[UnmatchedTrack]> = tracks.chunks(chunk_size).collect();

        for (index, chunk) in chunks.iter().enumerate() {
            info!(
                batch = index + 1,
                batches = chunks.len(),
                "Resolving track batch"
            );

            for track in *chunk {
                match self.resolve(&track.name, &track.artists).await {
                    Ok(Some(target_id)) => {
                        outcome.accepted.push((target_id.clone(), track.name.clone()));
                        outcome.mappings.push((track.source_id.clone(), target_id));
                    }
                    Ok(None) => {
                        warn!(track = %track.name, "No acceptable candidate");
                        outcome.failed.push(FailedTrack {
                            source_id: track.source_id.clone(),
                            name: track.name.clone(),
                            failure: MatchFailure::NoMatch,
                        });
                    }
                    Err(e) => {
                        error!(track = %track.name, error = %e, "Search failed after retries");
                        outcome.failed.push(FailedTrack {
                            source_id: track.source_id.clone(),
                            name: track.name.clone(),
                            failure: MatchFailure::SearchFailed(e),
                        });
                    }
                }
                tokio::time::sleep(self.config.search_pause).await;
            }

            if index + 1 < chunks.len() {
                tokio::time::sleep(self.config.batch_pause).await;
            }
        }

        outcome
    }

    /// Search with linear backoff: the nth retry waits `retry_delay * n`.
    async fn search_with_retry(&self, query: &str) -> Result<Vec<SearchCandidate>, CatalogError> {
        let mut attempt = 0u32;
        loop {
            match self.target.search(query).await {
                Ok(candidates) => return Ok(candidates),
                Err(e) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(query, attempt, error = %e, "Search failed, retrying");
                    tokio::time::sleep(self.config.retry_delay * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
