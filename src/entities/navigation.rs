//! Navigation entity - One entry in the site's navigation menu.
//!
//! Entries form a tree through the nullable `parent_id` column. The tree is
//! stored flat and walked by id lookup; nothing holds live links between rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Navigation item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "navigation")]
pub struct Model {
    /// Unique identifier, also the ordering tie-break
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Link text
    pub title: String,
    /// Link target, relative (`about.html`) or absolute
    pub url: String,
    /// Sort key among siblings, ascending
    pub position: i32,
    /// Parent entry, None for top-level entries
    pub parent_id: Option<i64>,
    /// Soft enable flag - inactive entries stay stored but are not published
    pub is_active: bool,
    /// Whether the link opens in a new browser tab
    pub open_new_tab: bool,
    /// Extra CSS class for the rendered link
    pub css_class: String,
    /// When the entry was created
    pub created_at: DateTime,
    /// When the entry was last modified
    pub updated_at: DateTime,
}

/// Defines the parent/child edge between navigation entries
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each child belongs to one parent entry
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "Cascade"
    )]
    Parent,
}

impl ActiveModelBehavior for ActiveModel {}
