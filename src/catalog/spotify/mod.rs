//! Spotify Web API integration (source catalog).
//!
//! Reads the authenticated user's playlists and their full membership.
//! API docs: https://developer.spotify.com/documentation/web-api

mod adapter;
mod client;
pub mod dto;

pub use client::SpotifyClient;
