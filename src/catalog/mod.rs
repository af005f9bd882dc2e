//! Catalog service integrations - the boundary to the source and target
//! music services.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`spotify/dto.rs`, `ytmusic/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for the remote services
//! - **Traits** (`traits.rs`) - `SourceCatalog` / `TargetCatalog` seams for
//!   the matcher, replicator, and orchestrator
//!
//! This decoupling means:
//! 1. API changes don't ripple through our codebase
//! 2. We can test API contracts independently
//! 3. We can swap services without changing reconciliation logic
//!
//! Both clients take pre-obtained credentials; obtaining them (OAuth,
//! browser flows) is outside this crate.

pub mod domain;
pub mod spotify;
pub mod traits;
pub mod ytmusic;

pub use domain::{AlbumRef, ArtistRef, CatalogError, SearchCandidate, SourcePlaylist, SourceTrack};
pub use spotify::SpotifyClient;
pub use traits::{SourceCatalog, TargetCatalog};
pub use ytmusic::YtMusicClient;
