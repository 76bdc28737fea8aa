//! Application settings loading from config.toml
//!
//! Every section is optional; a missing file or missing keys fall back to
//! defaults suitable for local development.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// API behaviour
    pub api: ApiConfig,
    /// Uploaded image storage
    pub media: MediaConfig,
    /// Achievements to get-or-create on start-up
    pub achievements: Vec<AchievementSeed>,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

/// `[api]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Cats per page on the list endpoint
    pub page_size: u64,
    /// Whether GET requests are allowed without a token
    pub anonymous_reads: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            anonymous_reads: false,
        }
    }
}

/// `[media]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Directory uploaded files are written to
    pub root: PathBuf,
    /// URL prefix the media directory is served under
    pub url: String,
    /// Scheme and host prepended to `image_url`, e.g. `https://kittygram.example`
    pub public_base_url: Option<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("media"),
            url: "/media/".to_string(),
            public_base_url: None,
        }
    }
}

/// A single `[[achievements]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct AchievementSeed {
    /// Name of the achievement
    pub name: String,
}

impl AppConfig {
    /// Checks values serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.api.page_size == 0 {
            return Err(Error::Config {
                message: "api.page_size must be at least 1".to_string(),
            });
        }
        if !self.media.url.starts_with('/') || !self.media.url.ends_with('/') {
            return Err(Error::Config {
                message: format!("media.url must start and end with '/': {}", self.media.url),
            });
        }
        Ok(())
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value is out of range
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;
    parse_config(&contents)
}

/// Parses and validates settings from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads settings from `KITTYGRAM_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error: defaults are used instead.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("KITTYGRAM_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_config(&path)
    } else {
        info!("No config file at {path}, using defaults");
        Ok(AppConfig::default())
    }
}
