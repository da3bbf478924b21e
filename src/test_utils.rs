//! Shared test utilities for `ForgeWeb`.
//!
//! This module provides common helper functions for setting up test databases,
//! stores and on-disk site layouts with sensible defaults.

use crate::{
    config::app::AppConfig,
    core::{
        navigation::{self, NewNavigationItem},
        store::ConfigStore,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a `ConfigStore` backed by a fresh in-memory database.
pub async fn setup_test_store() -> Result<ConfigStore> {
    Ok(ConfigStore::new(setup_test_db().await?))
}

/// Creates an active top-level navigation item.
///
/// # Defaults
/// * `url`: the lowercased title followed by `.html`
/// * `parent_id`: None
/// * `is_active`: true
pub async fn create_test_nav_item(
    db: &DatabaseConnection,
    title: &str,
    position: i32,
) -> Result<entities::navigation::Model> {
    let url = format!("{}.html", title.to_lowercase());
    navigation::add_navigation_item(db, NewNavigationItem::new(title, url).at_position(position))
        .await
}

/// Creates a temporary site layout: an `admin/` directory for the JSON
/// documents and a `website/` output root.
///
/// Keep the returned `TempDir` alive for as long as the paths are used.
pub fn setup_test_site() -> Result<(TempDir, AppConfig)> {
    let dir = tempfile::tempdir()?;
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        admin_dir: dir.path().join("admin"),
        website_root: dir.path().join("website"),
        templates_dir: None,
    };
    std::fs::create_dir_all(&config.admin_dir)?;
    Ok((dir, config))
}

/// Writes a JSON document, creating parent directories.
pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Reads a JSON document written by the code under test.
pub fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
