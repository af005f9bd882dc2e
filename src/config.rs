//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\playlist-porter\config.toml
//! - macOS: ~/Library/Application Support/playlist-porter/config.toml
//! - Linux: ~/.config/playlist-porter/config.toml
//!
//! The config file is human-readable and editable. Tokens can also be
//! supplied on the command line, which takes precedence over the file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::matcher::MatcherConfig;
use crate::replicator::ReplicatorConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials (keep separate for potential future encryption)
    pub credentials: Credentials,

    /// Transfer behaviour tuning
    pub transfer: TransferConfig,
}

/// API credentials and endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// OAuth bearer token for the source service
    pub source_token: Option<String>,

    /// Bearer token for the target bridge
    pub target_token: Option<String>,

    /// Base URL of the target bridge API
    pub target_url: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            source_token: None,
            target_token: None,
            target_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Transfer tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Directory for per-user mirror databases (None = data dir)
    pub db_dir: Option<PathBuf>,

    /// Tracks per search/append batch
    pub batch_size: usize,

    /// Retries per failed search or append
    pub max_retries: u32,

    /// Base retry delay in seconds (scales linearly with attempt)
    pub retry_delay_secs: u64,

    /// Pause between individual searches, in milliseconds
    pub search_pause_ms: u64,

    /// Pause between batches, in seconds
    pub batch_pause_secs: u64,

    /// Privacy status for created playlists
    pub privacy: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            batch_size: 5,
            max_retries: 3,
            retry_delay_secs: 5,
            search_pause_ms: 500,
            batch_pause_secs: 2,
            privacy: "UNLISTED".to_string(),
        }
    }
}

impl TransferConfig {
    /// Where the per-user databases live.
    pub fn db_dir(&self) -> PathBuf {
        self.db_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("playlist-porter")
        })
    }

    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            max_retries: self.max_retries,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            search_pause: Duration::from_millis(self.search_pause_ms),
            batch_size: self.batch_size,
            batch_pause: Duration::from_secs(self.batch_pause_secs),
        }
    }

    pub fn replicator_config(&self) -> ReplicatorConfig {
        ReplicatorConfig {
            batch_size: self.batch_size,
            max_retries: self.max_retries,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            batch_pause: Duration::from_secs(self.batch_pause_secs),
            privacy: self.privacy.clone(),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("playlist-porter"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    let path = dir.join("config.toml");

    // Ensure directory exists
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::CreateDir(dir.clone(), e))?;

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| ConfigError::Rename(temp_path, path.clone(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
