//! Application configuration loading from forgeweb.toml
//!
//! Every field is optional in the file; anything left out falls back to the
//! defaults below. Environment variables (usually from `.env`) override the
//! file so a local checkout can point at a different database or output tree
//! without editing it.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "forgeweb.toml";

/// Paths and connection settings for one admin instance
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// `SeaORM` connection URL for the configuration store
    pub database_url: String,
    /// Directory holding `site-config.json` and `branding-config.json`
    pub admin_dir: PathBuf,
    /// Root of the generated website
    pub website_root: PathBuf,
    /// Optional directory with `base.html` and `<page>-content.html` overrides
    pub templates_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: super::database::DEFAULT_DATABASE_URL.to_string(),
            admin_dir: PathBuf::from("admin"),
            website_root: PathBuf::from("website"),
            templates_dir: None,
        }
    }
}

impl AppConfig {
    /// Path of the legacy `site-config.json` document
    #[must_use]
    pub fn site_config_path(&self) -> PathBuf {
        self.admin_dir.join("site-config.json")
    }

    /// Path of the legacy `branding-config.json` document
    #[must_use]
    pub fn branding_config_path(&self) -> PathBuf {
        self.admin_dir.join("branding-config.json")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(dir) = std::env::var("FORGEWEB_ADMIN_DIR") {
            self.admin_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("FORGEWEB_WEBSITE_ROOT") {
            self.website_root = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("FORGEWEB_TEMPLATES_DIR") {
            self.templates_dir = Some(PathBuf::from(dir));
        }
    }
}

/// Parses an application configuration from TOML text
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or contains unknown keys.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {DEFAULT_CONFIG_FILE}: {e}"),
    })
}

/// Loads the application configuration from `path`, then applies environment
/// overrides
///
/// A missing file is not an error: defaults are used instead.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    let mut config = if path.exists() {
        tracing::debug!("Loading application configuration from {:?}", path);
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read config file {}: {e}", path.display()),
        })?;
        parse_config(&contents)?
    } else {
        tracing::debug!("No {:?} found, using default configuration", path);
        AppConfig::default()
    };

    config.apply_env_overrides();
    Ok(config)
}

/// Loads configuration from the default location (./forgeweb.toml)
pub fn load_default_config() -> Result<AppConfig> {
    load_config(DEFAULT_CONFIG_FILE)
}
