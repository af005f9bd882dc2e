//! Batch replication of playlists onto the target service.
//!
//! Creates the remote playlist (with sanitized name/description) and
//! appends matched tracks in bounded batches, sleeping between batches
//! to stay under the target's rate limits. Both write paths retry with
//! the same linear backoff as the matcher, then downgrade to a logged
//! failure - one playlist failing never takes its siblings down.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, info, warn};

use crate::catalog::traits::TargetCatalog;

/// Maximum playlist name length after sanitization.
pub const NAME_MAX_LEN: usize = 150;

/// Maximum description length after sanitization.
pub const DESC_MAX_LEN: usize = 500;

/// Characters outside letters/digits/whitespace/hyphen get stripped.
static SYMBOLS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));

/// Runs of whitespace collapse to a single space.
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Sanitize free text for submission to the target service.
///
/// Strips symbols, collapses whitespace runs, trims, and truncates to
/// `max_len` characters. May return an empty string; callers treat that
/// as a validation failure.
pub fn sanitize_text(text: &str, max_len: usize) -> String {
    let stripped = SYMBOLS.replace_all(text, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    let truncated: String = collapsed.trim().chars().take(max_len).collect();
    // Truncation can cut right after a space
    truncated.trim_end().to_string()
}

/// Tunables for batching and retry.
#[derive(Debug, Clone)]
pub struct ReplicatorConfig {
    /// Track ids per append call
    pub batch_size: usize,
    /// Retry ceiling shared with the matcher
    pub max_retries: u32,
    /// Base backoff delay; the nth retry waits `retry_delay * n`
    pub retry_delay: Duration,
    /// Fixed sleep between successive append batches
    pub batch_pause: Duration,
    /// Privacy status for created playlists
    pub privacy: String,
}

impl Default for ReplicatorConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
            batch_pause: Duration::from_secs(2),
            privacy: "UNLISTED".to_string(),
        }
    }
}

impl ReplicatorConfig {
    /// Zero-delay config so tests don't sleep.
    #[cfg(test)]
    pub fn fast() -> Self {
        Self {
            retry_delay: Duration::ZERO,
            batch_pause: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Result of replaying one playlist's membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Append batches the target acknowledged
    pub batches_ok: usize,
    /// Append batches that failed past the retry ceiling
    pub batches_failed: usize,
    /// Track ids submitted in acknowledged batches
    pub tracks_appended: usize,
}

impl ReplaySummary {
    /// True when every batch was acknowledged.
    pub fn complete(&self) -> bool {
        self.batches_failed == 0
    }
}

/// Materializes playlists on a [`TargetCatalog`].
pub struct Replicator<'a, T: TargetCatalog> {
    target: &'a T,
    config: ReplicatorConfig,
}

impl<'a, T: TargetCatalog> Replicator<'a, T> {
    pub fn new(target: &'a T, config: ReplicatorConfig) -> Self {
        Self { target, config }
    }

    /// Create the remote playlist, sanitizing name and description.
    ///
    /// An empty name after sanitization is a hard local failure: no
    /// remote call is attempted. Remote failures retry, then downgrade
    /// to `None`.
    pub async fn create_remote_playlist(
        &self,
        name: &str,
        description: &str,
    ) -> Option<String> {
        let sanitized_name = sanitize_text(name, NAME_MAX_LEN);
        let sanitized_description = sanitize_text(description, DESC_MAX_LEN);

        if sanitized_name.is_empty() {
            error!(name, "Playlist name empty after sanitization, skipping creation");
            return None;
        }

        let mut attempt = 0u32;
        loop {
            match self
                .target
                .create_playlist(&sanitized_name, &sanitized_description, &self.config.privacy)
                .await
            {
                Ok(id) => {
                    info!(playlist = %sanitized_name, target = %id, "Created remote playlist");
                    return Some(id);
                }
                Err(e) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(playlist = %sanitized_name, attempt, error = %e, "Playlist creation failed, retrying");
                    tokio::time::sleep(self.config.retry_delay * attempt).await;
                }
                Err(e) => {
                    error!(playlist = %sanitized_name, error = %e, "Failed to create remote playlist");
                    return None;
                }
            }
        }
    }

    /// Append one bounded batch of track ids.
    ///
    /// Null/empty ids are filtered out first; a batch with zero valid
    /// ids is a no-op `false`. Remote failures retry, then downgrade.
    pub async fn append_tracks(&self, target_playlist_id: &str, track_ids: &[String]) -> bool {
        let valid: Vec<String> = track_ids
            .iter()
            .filter(|id| !id.is_empty())
            .cloned()
            .collect();
        if valid.is_empty() {
            return false;
        }

        let mut attempt = 0u32;
        loop {
            match self.target.add_items(target_playlist_id, &valid).await {
                Ok(()) => return true,
                Err(e) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(playlist = target_playlist_id, attempt, error = %e, "Append failed, retrying");
                    tokio::time::sleep(self.config.retry_delay * attempt).await;
                }
                Err(e) => {
                    error!(playlist = target_playlist_id, error = %e, "Failed to append batch");
                    return false;
                }
            }
        }
    }

    /// Replay an ordered membership onto the target playlist in bounded
    /// batches, sleeping between batches. Order within and across
    /// batches preserves the input sequence, duplicates included.
    pub async fn replay_membership(
        &self,
        target_playlist_id: &str,
        ordered_track_ids: &[String],
    ) -> ReplaySummary {
        let mut summary = ReplaySummary::default();
        let chunk_size = self.config.batch_size.max(1);
        let chunks: Vec<&[String]> = ordered_track_ids.chunks(chunk_size).collect();

        for (index, chunk) in chunks.iter().enumerate() {
            if self.append_tracks(target_playlist_id, chunk).await {
                summary.batches_ok += 1;
                summary.tracks_appended += chunk.len();
            } else {
                summary.batches_failed += 1;
            }

            if index + 1 < chunks.len() {
                tokio::time::sleep(self.config.batch_pause).await;
            }
        }

        info!(
            playlist = target_playlist_id,
            appended = summary.tracks_appended,
            failed_batches = summary.batches_failed,
            "Membership replay finished"
        );
        summary
    }
}
