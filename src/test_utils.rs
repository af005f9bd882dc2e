//! Test utilities and fixtures for playlist-porter tests.
//!
//! This module provides common test helpers to reduce boilerplate:
//! a temporary per-user store and small catalog fixtures.
//!
//! # Example
//!
//! ```ignore
//! use playlist_porter::test_utils::temp_store;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (_dir, pool) = temp_store().await;
//!     // ... test logic
//! }
//! ```

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::catalog::domain::SourcePlaylist;

/// Creates a temporary per-user store for testing.
///
/// The database lives in a temporary directory that is deleted when the
/// returned `TempDir` is dropped - keep it alive for the duration of
/// the test.
pub async fn temp_store() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let pool = crate::store::open(dir.path(), "test-user")
        .await
        .expect("Failed to open test store");
    (dir, pool)
}

/// A source playlist fixture with a derived description.
pub fn sample_playlist(id: &str, name: &str) -> SourcePlaylist {
    SourcePlaylist {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(format!("{name} description")),
    }
}
