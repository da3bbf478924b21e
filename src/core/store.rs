//! Configuration store - Key/value records, scoped settings and the active design.
//!
//! `ConfigStore` wraps the database connection and is the single source of
//! truth for configuration once populated. A store can also be built without
//! a connection (`ConfigStore::unavailable`): every operation then fails with
//! `Error::StoreUnavailable`, which lets callers tell "nothing configured"
//! (`Ok(None)`) apart from "cannot ask" and fall back accordingly.
//!
//! ## Value encoding
//!
//! Values share one text column without a type tag. Plain strings are stored
//! as-is; every other JSON value is stored as JSON text. Reading attempts a
//! JSON parse and returns the raw string if that fails.
//!
//! Known limitation: a plain string that happens to be valid JSON (`"42"`,
//! `"true"`, `"[1]"`) is read back as the parsed value, not as a string.
//! Existing databases depend on this encoding, so it is kept as-is.

use crate::{
    entities::{DesignConfig, Setting, SiteConfig, design_config, setting, site_config},
    errors::{Error, Result},
};
use chrono::{NaiveDateTime, TimeDelta, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The active design system, decoded from its database row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignSettings {
    /// Design system name (e.g., "tailwind")
    pub system: String,
    /// CDN URLs to load, in order
    pub cdn_urls: Vec<String>,
    /// Classes applied to every page's `<body>`
    #[serde(default)]
    pub body_classes: String,
    /// Extra CSS shipped with the design
    #[serde(default)]
    pub custom_css: String,
}

impl DesignSettings {
    fn from_model(model: design_config::Model) -> Result<Self> {
        Ok(Self {
            system: model.system_name,
            cdn_urls: serde_json::from_str(&model.cdn_urls)?,
            body_classes: model.body_classes,
            custom_css: model.custom_css,
        })
    }
}

/// Encodes a value for the shared text column.
#[must_use]
pub fn encode_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Decodes a stored value, preferring a JSON parse over the raw string.
#[must_use]
pub fn decode_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Next `updated_at` for a row last written at `previous`: now, unless the
/// clock has not moved past `previous`.
fn next_timestamp(previous: Option<NaiveDateTime>) -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    match previous {
        Some(prev) if prev >= now => prev + TimeDelta::microseconds(1),
        _ => now,
    }
}

/// Handle to the persistent configuration store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    db: Option<DatabaseConnection>,
}

impl ConfigStore {
    /// Creates a store backed by an open database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db: Some(db) }
    }

    /// Creates a store with no backing database; every operation reports
    /// `Error::StoreUnavailable`.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { db: None }
    }

    /// Whether a database connection was supplied.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.db.is_some()
    }

    /// Returns the underlying connection, or `StoreUnavailable` if there is none.
    pub fn connection(&self) -> Result<&DatabaseConnection> {
        self.db.as_ref().ok_or_else(|| Error::StoreUnavailable {
            message: "no database connection configured".to_string(),
        })
    }

    /// Reads a site configuration value. `Ok(None)` means the key was never set.
    pub async fn get_value(&self, key: &str) -> Result<Option<Value>> {
        let db = self.connection()?;
        let record = SiteConfig::find_by_id(key.to_string()).one(db).await?;
        Ok(record.map(|r| decode_value(&r.value)))
    }

    /// Reads a site configuration value, substituting `default` when unset.
    pub async fn get_value_or(&self, key: &str, default: Value) -> Result<Value> {
        Ok(self.get_value(key).await?.unwrap_or(default))
    }

    /// Writes a site configuration value, replacing any previous value for the key.
    pub async fn set_value(&self, key: &str, value: &Value) -> Result<()> {
        let db = self.connection()?;
        let txn = db.begin().await?;

        let existing = SiteConfig::find_by_id(key.to_string()).one(&txn).await?;
        let updated_at = next_timestamp(existing.as_ref().map(|r| r.updated_at));

        if let Some(record) = existing {
            let mut active_model: site_config::ActiveModel = record.into();
            active_model.value = Set(encode_value(value));
            active_model.updated_at = Set(updated_at);
            active_model.update(&txn).await?;
        } else {
            site_config::ActiveModel {
                key: Set(key.to_string()),
                value: Set(encode_value(value)),
                updated_at: Set(updated_at),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        tracing::debug!("Stored site config key {:?}", key);
        Ok(())
    }

    /// Reads a category-scoped setting. `Ok(None)` means it was never set.
    pub async fn get_setting(&self, category: &str, key: &str) -> Result<Option<Value>> {
        let db = self.connection()?;
        let record = Setting::find()
            .filter(setting::Column::Category.eq(category))
            .filter(setting::Column::Key.eq(key))
            .one(db)
            .await?;
        Ok(record.map(|r| decode_value(&r.value)))
    }

    /// Reads a category-scoped setting, substituting `default` when unset.
    pub async fn get_setting_or(&self, category: &str, key: &str, default: Value) -> Result<Value> {
        Ok(self.get_setting(category, key).await?.unwrap_or(default))
    }

    /// Writes a category-scoped setting, replacing any previous value for the
    /// `(category, key)` pair.
    pub async fn set_setting(&self, category: &str, key: &str, value: &Value) -> Result<()> {
        let db = self.connection()?;
        let txn = db.begin().await?;

        let existing = Setting::find()
            .filter(setting::Column::Category.eq(category))
            .filter(setting::Column::Key.eq(key))
            .one(&txn)
            .await?;
        let updated_at = next_timestamp(existing.as_ref().map(|r| r.updated_at));

        if let Some(record) = existing {
            let mut active_model: setting::ActiveModel = record.into();
            active_model.value = Set(encode_value(value));
            active_model.updated_at = Set(updated_at);
            active_model.update(&txn).await?;
        } else {
            setting::ActiveModel {
                category: Set(category.to_string()),
                key: Set(key.to_string()),
                value: Set(encode_value(value)),
                updated_at: Set(updated_at),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    /// Returns every setting in a category, keyed and ordered by setting key.
    pub async fn settings_in(&self, category: &str) -> Result<BTreeMap<String, Value>> {
        let db = self.connection()?;
        let records = Setting::find()
            .filter(setting::Column::Category.eq(category))
            .order_by_asc(setting::Column::Key)
            .all(db)
            .await?;
        Ok(records
            .into_iter()
            .map(|r| (r.key, decode_value(&r.value)))
            .collect())
    }

    /// Returns the active design, if one has been chosen.
    pub async fn get_active_design(&self) -> Result<Option<DesignSettings>> {
        let db = self.connection()?;
        let model = DesignConfig::find()
            .filter(design_config::Column::IsActive.eq(true))
            .order_by_desc(design_config::Column::UpdatedAt)
            .order_by_desc(design_config::Column::Id)
            .one(db)
            .await?;
        model.map(DesignSettings::from_model).transpose()
    }

    /// Makes `design` the only active design.
    ///
    /// Deactivation and insertion run in one transaction: if the insert fails
    /// the deactivation is rolled back and the previously active design stays
    /// active.
    pub async fn set_active_design(&self, design: &DesignSettings) -> Result<design_config::Model> {
        if design.system.trim().is_empty() {
            return Err(Error::validation("Design system name cannot be empty"));
        }

        let db = self.connection()?;
        let cdn_urls = serde_json::to_string(&design.cdn_urls)?;
        let now = Utc::now().naive_utc();

        let txn = db.begin().await?;

        DesignConfig::update_many()
            .col_expr(design_config::Column::IsActive, Expr::value(false))
            .filter(design_config::Column::IsActive.eq(true))
            .exec(&txn)
            .await?;

        let inserted = design_config::ActiveModel {
            system_name: Set(design.system.trim().to_string()),
            cdn_urls: Set(cdn_urls),
            body_classes: Set(design.body_classes.clone()),
            custom_css: Set(design.custom_css.clone()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!("Design system set to {}", inserted.system_name);
        Ok(inserted)
    }
}
