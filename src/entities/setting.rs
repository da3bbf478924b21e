//! Setting entity - Category-scoped application settings.
//!
//! The `(category, key)` pair is unique; the index backing that is created
//! alongside the table in `config::database::create_tables`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Setting database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Namespace for the setting (e.g., `"general"`, `"seo"`)
    pub category: String,
    /// Setting key within the category
    pub key: String,
    /// Stored value: raw text for plain strings, JSON text otherwise
    pub value: String,
    /// When this setting was last written
    pub updated_at: DateTime,
}

/// No relations to other tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
