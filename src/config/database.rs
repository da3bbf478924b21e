//! Database configuration module for `ForgeWeb`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! models. The one constraint the entity macros cannot express, the composite
//! `(category, key)` uniqueness of settings, is added as an explicit index.

use crate::entities::{DesignConfig, Navigation, Setting, SiteConfig, setting};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;

/// Default database location, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://admin/forgeweb.db?mode=rwc";

/// Establishes a connection to the `SQLite` database at `database_url`.
///
/// For file-backed databases the parent directory is created first, since
/// `SQLite` will create the file but not the directories leading to it.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_path(database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Database::connect(database_url).await.map_err(Into::into)
}

fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next()?;
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

/// Creates all necessary database tables if they do not exist yet.
///
/// Safe to call on every start: existing tables and data are left alone.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    for mut table in [
        schema.create_table_from_entity(SiteConfig),
        schema.create_table_from_entity(DesignConfig),
        schema.create_table_from_entity(Setting),
        schema.create_table_from_entity(Navigation),
    ] {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    let settings_index = Index::create()
        .name("idx_settings_category_key")
        .table(Setting)
        .col(setting::Column::Category)
        .col(setting::Column::Key)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&settings_index)).await?;

    Ok(())
}
