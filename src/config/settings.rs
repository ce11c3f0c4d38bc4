//! Application settings loading from config.toml
//!
//! The TOML file carries the non-secret settings: where the collection files
//! live, which display endpoint to push to, and the scheduler period. The
//! display API key is a secret and is read from the `DISPLAY_API_KEY`
//! environment variable instead (see [`crate::display::DisplayClient::from_env`]).

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Collection store location
    #[serde(default)]
    pub storage: StorageSettings,
    /// External signage display endpoint and rotation period
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// Directory holding the collection JSON files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    /// Hostname of the signage service (no scheme)
    pub domain: String,
    /// Items group the payload is pushed into
    pub items_group: String,
    /// Scheduler tick period in seconds
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
    /// Sentinel image reference pushed when no ad is active
    #[serde(default = "default_no_ad_image")]
    pub no_ad_image: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

const fn default_tick_seconds() -> u64 {
    5
}

fn default_no_ad_image() -> String {
    "uploads/no-ad.png".to_string()
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from the default location (./config.toml)
pub fn load_default_settings() -> Result<Settings> {
    load_settings("config.toml")
}
