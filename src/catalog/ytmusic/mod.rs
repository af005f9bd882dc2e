//! YouTube Music integration (target catalog).
//!
//! Talks to a ytmusicapi-compatible HTTP bridge: song search, playlist
//! creation, and batch item appends. The bridge holds the browser
//! session; this client only carries its access token.

mod adapter;
mod client;
pub mod dto;

pub use client::YtMusicClient;
