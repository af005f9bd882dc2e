//! Trait definitions for the catalog service clients.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real client implementations, while tests
//! can substitute mock implementations.
//!
//! The contracts are deliberately flat: both traits produce finite,
//! already-paginated sequences, so callers never deal with paging.

use async_trait::async_trait;

use super::domain::{CatalogError, SearchCandidate, SourcePlaylist, SourceTrack};

/// The music service playlists are read from.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    /// Id of the authenticated account. Used to name the per-user store.
    async fn current_user_id(&self) -> Result<String, CatalogError>;

    /// All playlists owned by or followed by the authenticated account.
    async fn list_playlists(&self) -> Result<Vec<SourcePlaylist>, CatalogError>;

    /// Full membership of one playlist, flattened across pages, in
    /// playback order. Unplayable entries are already skipped.
    async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<SourceTrack>, CatalogError>;
}

/// The music service playlists are written to.
#[async_trait]
pub trait TargetCatalog: Send + Sync {
    /// Ranked search against the target's song catalog.
    async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, CatalogError>;

    /// Create a playlist and return its id.
    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: &str,
    ) -> Result<String, CatalogError>;

    /// Append items to a playlist. Duplicates are allowed; success is
    /// batch-level only, with no per-item confirmation.
    async fn add_items(&self, playlist_id: &str, item_ids: &[String]) -> Result<(), CatalogError>;
}

// Implement traits for real clients

#[async_trait]
impl SourceCatalog for super::spotify::SpotifyClient {
    async fn current_user_id(&self) -> Result<String, CatalogError> {
        self.current_user_id().await
    }

    async fn list_playlists(&self) -> Result<Vec<SourcePlaylist>, CatalogError> {
        self.list_playlists().await
    }

    async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<SourceTrack>, CatalogError> {
        self.list_tracks(playlist_id).await
    }
}

#[async_trait]
impl TargetCatalog for super::ytmusic::YtMusicClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, CatalogError> {
        self.search(query).await
    }

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: &str,
    ) -> Result<String, CatalogError> {
        self.create_playlist(title, description, privacy).await
    }

    async fn add_items(&self, playlist_id: &str, item_ids: &[String]) -> Result<(), CatalogError> {
        self.add_items(playlist_id, item_ids).await
    }
}

/// Mock catalog clients for testing.
///
/// Return configurable responses for testing different scenarios.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::catalog::domain::{AlbumRef, ArtistRef};
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Build a [`SourceTrack`] with deterministic album/artist ids.
    pub fn source_track(id: &str, name: &str, artists: &[&str]) -> SourceTrack {
        SourceTrack {
            id: id.to_string(),
            name: name.to_string(),
            album: AlbumRef {
                id: format!("album-{id}"),
                name: format!("Album of {name}"),
                release_date: "2020-01-01".to_string(),
            },
            artists: artists
                .iter()
                .map(|a| ArtistRef {
                    id: format!("artist-{}", a.to_lowercase().replace(' ', "-")),
                    name: a.to_string(),
                })
                .collect(),
        }
    }

    /// Mock source catalog with in-memory playlists and membership.
    pub struct MockSource {
        /// Authenticated user id
        pub user_id: String,
        /// Playlists returned by `list_playlists`
        pub playlists: Vec<SourcePlaylist>,
        /// Membership per playlist id
        pub tracks: HashMap<String, Vec<SourceTrack>>,
        /// Playlist ids whose `list_tracks` call errors
        pub failing_playlists: Vec<String>,
    }

    impl MockSource {
        pub fn new(user_id: &str) -> Self {
            Self {
                user_id: user_id.to_string(),
                playlists: Vec::new(),
                tracks: HashMap::new(),
                failing_playlists: Vec::new(),
            }
        }

        /// Add a playlist with the given membership, in order.
        pub fn with_playlist(mut self, id: &str, name: &str, tracks: Vec<SourceTrack>) -> Self {
            self.playlists.push(SourcePlaylist {
                id: id.to_string(),
                name: name.to_string(),
                description: Some(format!("{name} description")),
            });
            self.tracks.insert(id.to_string(), tracks);
            self
        }
    }

    #[async_trait]
    impl SourceCatalog for MockSource {
        async fn current_user_id(&self) -> Result<String, CatalogError> {
            Ok(self.user_id.clone())
        }

        async fn list_playlists(&self) -> Result<Vec<SourcePlaylist>, CatalogError> {
            Ok(self.playlists.clone())
        }

        async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<SourceTrack>, CatalogError> {
            if self.failing_playlists.iter().any(|p| p == playlist_id) {
                return Err(CatalogError::Network("simulated outage".to_string()));
            }
            self.tracks
                .get(playlist_id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(playlist_id.to_string()))
        }
    }

    /// Mock target catalog recording every write and replaying scripted
    /// search outcomes per query string.
    #[derive(Default)]
    pub struct MockTarget {
        /// Scripted search outcomes, consumed front-to-back per query.
        /// An exhausted or missing script yields an empty result list.
        searches: Mutex<HashMap<String, VecDeque<Result<Vec<SearchCandidate>, CatalogError>>>>,
        /// Recorded `create_playlist` calls as (title, description, privacy)
        pub created: Mutex<Vec<(String, String, String)>>,
        /// Recorded `add_items` calls as (playlist_id, item_ids)
        pub appended: Mutex<Vec<(String, Vec<String>)>>,
        /// Number of upcoming `create_playlist` calls that will error
        fail_creates: Mutex<u32>,
        /// Number of upcoming `add_items` calls that will error
        fail_appends: Mutex<u32>,
        /// Every query string passed to `search`, in call order
        pub search_log: Mutex<Vec<String>>,
        playlist_seq: Mutex<u32>,
    }

    impl MockTarget {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue one search outcome for the exact query string.
        pub fn on_search(
            &self,
            query: &str,
            outcome: Result<Vec<SearchCandidate>, CatalogError>,
        ) {
            self.searches
                .lock()
                .unwrap()
                .entry(query.to_string())
                .or_default()
                .push_back(outcome);
        }

        /// Queue a single-candidate hit whose title and artist mirror the
        /// query track exactly (similarity 1.0).
        pub fn on_search_hit(&self, query: &str, target_id: &str, title: &str, artist: &str) {
            self.on_search(
                query,
                Ok(vec![SearchCandidate {
                    id: target_id.to_string(),
                    title: title.to_string(),
                    artists: vec![artist.to_string()],
                }]),
            );
        }

        pub fn fail_next_creates(&self, n: u32) {
            *self.fail_creates.lock().unwrap() = n;
        }

        pub fn fail_next_appends(&self, n: u32) {
            *self.fail_appends.lock().unwrap() = n;
        }

        /// All item ids appended so far, flattened in call order.
        pub fn appended_ids(&self) -> Vec<String> {
            self.appended
                .lock()
                .unwrap()
                .iter()
                .flat_map(|(_, ids)| ids.clone())
                .collect()
        }

        pub fn created_count(&self) -> usize {
            self.created.lock().unwrap().len()
        }

        /// How many times the given query was searched.
        pub fn search_count(&self, query: &str) -> usize {
            self.search_log
                .lock()
                .unwrap()
                .iter()
                .filter(|q| q.as_str() == query)
                .count()
        }
    }

    #[async_trait]
    impl TargetCatalog for MockTarget {
        async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, CatalogError> {
            self.search_log.lock().unwrap().push(query.to_string());
            let mut searches = self.searches.lock().unwrap();
            match searches.get_mut(query).and_then(|q| q.pop_front()) {
                Some(outcome) => outcome,
                None => Ok(vec![]),
            }
        }

        async fn create_playlist(
            &self,
            title: &str,
            description: &str,
            privacy: &str,
        ) -> Result<String, CatalogError> {
            {
                let mut failures = self.fail_creates.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(CatalogError::Network("simulated create failure".to_string()));
                }
            }
            self.created.lock().unwrap().push((
                title.to_string(),
                description.to_string(),
                privacy.to_string(),
            ));
            let mut seq = self.playlist_seq.lock().unwrap();
            *seq += 1;
            Ok(format!("target-pl-{}", *seq))
        }

        async fn add_items(
            &self,
            playlist_id: &str,
            item_ids: &[String],
        ) -> Result<(), CatalogError> {
            {
                let mut failures = self.fail_appends.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(CatalogError::Network("simulated append failure".to_string()));
                }
            }
            self.appended
                .lock()
                .unwrap()
                .push((playlist_id.to_string(), item_ids.to_vec()));
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_source_membership() {
            let source = MockSource::new("user-1").with_playlist(
                "pl-1",
                "Road Songs",
                vec![source_track("t1", "Highway Star", &["Deep Purple"])],
            );

            assert_eq!(source.current_user_id().await.unwrap(), "user-1");
            let playlists = source.list_playlists().await.unwrap();
            assert_eq!(playlists.len(), 1);
            let tracks = source.list_tracks("pl-1").await.unwrap();
            assert_eq!(tracks[0].name, "Highway Star");
            assert_eq!(tracks[0].artists[0].name, "Deep Purple");
        }

        #[tokio::test]
        async fn test_mock_source_unknown_playlist() {
            let source = MockSource::new("user-1");
            let result = source.list_tracks("missing").await;
            assert!(matches!(result, Err(CatalogError::NotFound(_))));
        }

        #[tokio::test]
        async fn test_mock_target_scripted_search() {
            let target = MockTarget::new();
            target.on_search_hit("song band", "vid-1", "song", "band");
            target.on_search(
                "song band",
                Err(CatalogError::Network("down".to_string())),
            );

            let first = target.search("song band").await.unwrap();
            assert_eq!(first[0].id, "vid-1");
            assert!(target.search("song band").await.is_err());
            // Exhausted script yields no results
            assert!(target.search("song band").await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_mock_target_records_writes() {
            let target = MockTarget::new();
            let id = target
                .create_playlist("My List", "desc", "UNLISTED")
                .await
                .unwrap();
            target
                .add_items(&id, &["a".to_string(), "b".to_string()])
                .await
                .unwrap();

            assert_eq!(target.created_count(), 1);
            assert_eq!(target.appended_ids(), vec!["a", "b"]);
        }
    }
}
