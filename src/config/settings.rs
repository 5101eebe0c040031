//! Application settings loaded from a TOML file.
//!
//! The file is optional; every section falls back to defaults. Restaurants listed
//! under `[[restaurants]]` are seeded into the database on first start.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire settings file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// How callers are identified
    pub identity: IdentityConfig,
    /// Restaurants to create when they do not exist yet
    pub restaurants: Vec<RestaurantSeed>,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `"0.0.0.0:3000"`
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Caller identification. Authentication happens upstream at the identity
/// provider; the gateway forwards the authenticated subject in a header.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Header carrying the authenticated user id
    pub user_header: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_header: "x-user-id".to_string(),
        }
    }
}

/// A restaurant to seed
#[derive(Debug, Deserialize, Clone)]
pub struct RestaurantSeed {
    /// Restaurant name; seeding is skipped when one with this name exists
    pub name: String,
    /// Identity-provider subject of the owner
    pub owner_user_id: String,
    /// IANA timezone name
    pub timezone: String,
    /// `"HH:MM"` opening time
    pub opening_time: String,
    /// `"HH:MM"` closing time
    pub closing_time: String,
    /// Number of tables to create, named `T1`..`Tn`
    #[serde(default)]
    pub tables: u32,
    /// Seats per seeded table
    #[serde(default = "default_table_capacity")]
    pub table_capacity: i32,
}

const fn default_table_capacity() -> i32 {
    4
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Loads settings from `TABLESIDE_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error: defaults are used.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("TABLESIDE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        tracing::warn!("Config file {path} not found, using defaults");
        return Ok(AppConfig::default());
    }
    load_config(&path)
}
