//! Site configuration entity - Stores key-value records for site-wide configuration.
//! Used for structured records like `site`, `branding`, `social`, `github` and
//! `content`, each serialized into a single text column.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Site configuration database model - one live value per key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_config")]
pub struct Model {
    /// Configuration key (e.g., `"branding"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Stored value: raw text for plain strings, JSON text otherwise
    pub value: String,
    /// When this record was last written
    pub updated_at: DateTime,
}

/// `SiteConfig` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
