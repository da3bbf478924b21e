//! Design configuration entity - The CSS framework a site is built on.
//!
//! Rows are never updated in place: choosing a design inserts a new row and
//! deactivates the rest, so at most one row has `is_active = true`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Design configuration database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "design_config")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Design system name (e.g., "tailwind", "bootstrap")
    pub system_name: String,
    /// Ordered CDN URLs, JSON-encoded
    pub cdn_urls: String,
    /// Classes applied to every page's `<body>`
    pub body_classes: String,
    /// Extra CSS shipped with the design
    pub custom_css: String,
    /// Whether this is the design currently in use
    pub is_active: bool,
    /// When the row was inserted
    pub created_at: DateTime,
    /// When the row was last modified
    pub updated_at: DateTime,
}

/// No relations to other tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
