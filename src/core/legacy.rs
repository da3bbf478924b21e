//! Legacy JSON documents kept next to the store.
//!
//! Older installs keep their configuration in `admin/site-config.json` and
//! `admin/branding-config.json`. Both are still read as a fallback layer and
//! still written alongside the store so that tools reading the files keep
//! working.
//!
//! Reads are lenient: a missing or unparsable document is treated as absent
//! (the latter with a warning). Writes are strict and never clobber a
//! document that exists but cannot be parsed.

use crate::{
    config::app::AppConfig,
    core::store::{ConfigStore, DesignSettings},
    errors::{Error, Result},
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Top-level `site-config.json` sections copied into the store by
/// [`migrate_from_legacy`].
const MIGRATED_SECTIONS: [&str; 3] = ["site", "branding", "social"];

/// Locations of the two legacy documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyDocuments {
    site_config_path: PathBuf,
    branding_config_path: PathBuf,
}

impl LegacyDocuments {
    /// Documents at explicit paths.
    #[must_use]
    pub const fn new(site_config_path: PathBuf, branding_config_path: PathBuf) -> Self {
        Self {
            site_config_path,
            branding_config_path,
        }
    }

    /// Documents in the configured admin directory.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.site_config_path(), config.branding_config_path())
    }

    /// Location of `site-config.json`
    #[must_use]
    pub fn site_config_path(&self) -> &Path {
        &self.site_config_path
    }

    /// Location of `branding-config.json`
    #[must_use]
    pub fn branding_config_path(&self) -> &Path {
        &self.branding_config_path
    }

    /// Parsed `site-config.json`, if it exists and holds a JSON object.
    #[must_use]
    pub fn site_config(&self) -> Option<Map<String, Value>> {
        read_object(&self.site_config_path)
    }

    /// Parsed `branding-config.json`, if it exists and holds a JSON object.
    #[must_use]
    pub fn branding_config(&self) -> Option<Map<String, Value>> {
        read_object(&self.branding_config_path)
    }

    /// One top-level section of `site-config.json`.
    #[must_use]
    pub fn site_section(&self, name: &str) -> Option<Value> {
        self.site_config()?.remove(name)
    }

    /// Read-modify-write of `site-config.json`. A missing document starts
    /// out empty.
    pub fn update_site_config<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let mut document = if self.site_config_path.exists() {
            let text = std::fs::read_to_string(&self.site_config_path)?;
            match serde_json::from_str::<Value>(&text)? {
                Value::Object(map) => map,
                _ => {
                    return Err(Error::Config {
                        message: format!(
                            "{} does not contain a JSON object",
                            self.site_config_path.display()
                        ),
                    });
                }
            }
        } else {
            Map::new()
        };

        update(&mut document);
        write_pretty(&self.site_config_path, &Value::Object(document))
    }

    /// Replaces one top-level section of `site-config.json`.
    pub fn set_site_section(&self, name: &str, value: Value) -> Result<()> {
        self.update_site_config(|doc| {
            doc.insert(name.to_string(), value);
        })
    }

    /// Overwrites `branding-config.json` with `branding`.
    pub fn write_branding_config(&self, branding: &Value) -> Result<()> {
        write_pretty(&self.branding_config_path, branding)
    }
}

fn read_object(path: &Path) -> Option<Map<String, Value>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            tracing::warn!("Ignoring {}: not a JSON object", path.display());
            None
        }
        Err(e) => {
            tracing::warn!("Could not parse {}: {}", path.display(), e);
            None
        }
    }
}

fn write_pretty(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Decodes the `design` section of `site-config.json`. Missing fields take
/// the same defaults the admin UI uses.
#[must_use]
pub fn design_from_section(section: &Value) -> DesignSettings {
    let text = |key: &str| {
        section
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let system = section
        .get("system")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("tailwind")
        .to_string();

    let cdn_urls = section
        .get("cdn_urls")
        .and_then(Value::as_array)
        .map(|urls| {
            urls.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    DesignSettings {
        system,
        cdn_urls,
        body_classes: text("body_classes"),
        custom_css: text("custom_css"),
    }
}

/// Copies the legacy documents into the store.
///
/// `site`, `branding` and `social` become store records and `design` becomes
/// the active design. A `branding-config.json` replaces the branding taken
/// from `site-config.json`. Returns the store keys written, in order.
pub async fn migrate_from_legacy(
    store: &ConfigStore,
    docs: &LegacyDocuments,
) -> Result<Vec<String>> {
    // Fail before touching any document if there is nowhere to put it
    store.connection()?;

    let mut migrated = Vec::new();

    if let Some(site_config) = docs.site_config() {
        for section in MIGRATED_SECTIONS {
            if let Some(value) = site_config.get(section) {
                store.set_value(section, value).await?;
                migrated.push(section.to_string());
            }
        }

        if let Some(design) = site_config.get("design") {
            store.set_active_design(&design_from_section(design)).await?;
            migrated.push("design".to_string());
        }

        tracing::info!("Migrated {} to the store", docs.site_config_path().display());
    }

    if let Some(branding) = docs.branding_config() {
        store.set_value("branding", &Value::Object(branding)).await?;
        if !migrated.iter().any(|k| k == "branding") {
            migrated.push("branding".to_string());
        }
        tracing::info!(
            "Migrated {} to the store",
            docs.branding_config_path().display()
        );
    }

    Ok(migrated)
}
