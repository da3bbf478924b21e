//! Operator actions - What the admin front end asks the core to do.
//!
//! `SiteAdmin` owns the [`SiteGenerator`] behind one `tokio::sync::Mutex`.
//! Every action holds that lock for its whole read-modify-write, so store
//! mutations, JSON document rewrites and generation passes never interleave.
//!
//! Navigation actions need the store and fail with `StoreUnavailable`
//! without it. The `save_*` actions always rewrite the legacy JSON documents
//! and skip the store write, with a warning, when no store is connected.

use crate::{
    config::app::AppConfig,
    core::{
        generator::{ArtifactOutcome, GenerationReport, SITE_CONFIG_JS_PATH, SiteGenerator},
        navigation::{self, NavigationPatch, NewNavigationItem},
        resolver::{
            DEFAULT_SITE_AUTHOR, DEFAULT_SITE_DESCRIPTION, DEFAULT_SITE_NAME, DEFAULT_SITE_URL,
            ResolvedConfig, flatten_branding, resolve_config,
        },
        store::{ConfigStore, DesignSettings},
    },
    entities::navigation as nav_entity,
    errors::{Error, Result},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Settings grouped by category, then key
pub type SettingsMap = BTreeMap<String, BTreeMap<String, Value>>;

/// The site setup form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteSetup {
    /// Site name, required
    pub site_name: String,
    /// One-line description for meta tags and the hero
    pub site_description: String,
    /// Author shown in the footer
    pub site_author: String,
    /// Explicit site URL; derived from the GitHub names when absent
    pub site_url: Option<String>,
    /// GitHub account that hosts the site
    pub github_username: String,
    /// Repository name under `github_username`
    pub github_repo: String,
    /// Kind of site, e.g. "blog" or "portfolio"
    pub site_type: String,
    /// Generate `about.html`
    pub include_about: bool,
    /// Generate `contact.html`
    pub include_contact: bool,
    /// Link a blog section
    pub include_blog: bool,
    /// Link a portfolio section
    pub include_portfolio: bool,
    /// Link a services section
    pub include_services: bool,
    /// Seed pages with sample copy
    pub include_sample_content: bool,
}

impl Default for SiteSetup {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            site_description: DEFAULT_SITE_DESCRIPTION.to_string(),
            site_author: DEFAULT_SITE_AUTHOR.to_string(),
            site_url: None,
            github_username: String::new(),
            github_repo: String::new(),
            site_type: "blog".to_string(),
            include_about: true,
            include_contact: true,
            include_blog: true,
            include_portfolio: false,
            include_services: false,
            include_sample_content: true,
        }
    }
}

impl SiteSetup {
    /// The public URL: explicit, else GitHub Pages, else the placeholder.
    #[must_use]
    pub fn url(&self) -> String {
        if let Some(url) = self.site_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.trim().to_string();
        }
        let user = self.github_username.trim();
        let repo = self.github_repo.trim();
        if user.is_empty() || repo.is_empty() {
            DEFAULT_SITE_URL.to_string()
        } else {
            format!("https://{user}.github.io/{repo}")
        }
    }

    fn site_section(&self) -> Value {
        json!({
            "name": self.site_name.trim(),
            "url": self.url(),
            "description": self.site_description.trim(),
            "author": self.site_author.trim(),
        })
    }

    fn github_section(&self) -> Value {
        json!({
            "username": self.github_username.trim(),
            "repo": self.github_repo.trim(),
            "pages_enabled": true,
        })
    }

    fn content_section(&self) -> Value {
        json!({
            "site_type": self.site_type,
            "include_about": self.include_about,
            "include_contact": self.include_contact,
            "include_blog": self.include_blog,
            "include_portfolio": self.include_portfolio,
            "include_services": self.include_services,
            "include_sample_content": self.include_sample_content,
        })
    }
}

/// A navigation change together with the `site-config.js` rewrite it caused
#[derive(Debug)]
pub struct NavigationChange<T> {
    /// What the navigation operation returned
    pub value: T,
    /// Never turns the change itself into a failure
    pub regeneration: GenerationReport,
}

/// Entry point for every operator action
#[derive(Debug)]
pub struct SiteAdmin {
    generator: Mutex<SiteGenerator>,
}

impl SiteAdmin {
    /// Creates an admin over the given store and the paths in `config`.
    #[must_use]
    pub fn new(config: &AppConfig, store: ConfigStore) -> Self {
        Self::from_generator(SiteGenerator::new(config, store))
    }

    /// Wraps an existing generator.
    #[must_use]
    pub fn from_generator(generator: SiteGenerator) -> Self {
        Self {
            generator: Mutex::new(generator),
        }
    }

    /// Runs a full generation pass.
    pub async fn generate_site(&self) -> Result<GenerationReport> {
        let mut generator = self.generator.lock().await;
        generator.generate_site().await
    }

    /// The merged configuration as generation would see it now.
    pub async fn resolved_config(&self) -> Result<ResolvedConfig> {
        let generator = self.generator.lock().await;
        resolve_config(generator.store(), generator.documents()).await
    }

    // Navigation

    /// Lists stored navigation entries ordered by position, then id.
    pub async fn list_navigation(&self, active_only: bool) -> Result<Vec<nav_entity::Model>> {
        let generator = self.generator.lock().await;
        let db = generator.store().connection()?;
        navigation::list_navigation_items(db, active_only).await
    }

    /// Adds a navigation entry and rewrites `site-config.js`.
    pub async fn add_navigation(
        &self,
        item: NewNavigationItem,
    ) -> Result<NavigationChange<nav_entity::Model>> {
        let mut generator = self.generator.lock().await;
        let db = generator.store().connection()?;
        let created = navigation::add_navigation_item(db, item).await?;
        Ok(after_navigation_change(&mut generator, created).await)
    }

    /// Applies a partial update to an entry and rewrites `site-config.js`.
    pub async fn update_navigation(
        &self,
        id: i64,
        patch: NavigationPatch,
    ) -> Result<NavigationChange<nav_entity::Model>> {
        let mut generator = self.generator.lock().await;
        let db = generator.store().connection()?;
        let updated = navigation::update_navigation_item(db, id, patch).await?;
        Ok(after_navigation_change(&mut generator, updated).await)
    }

    /// Deletes an entry and its subtree; the value is the number removed.
    pub async fn delete_navigation(&self, id: i64) -> Result<NavigationChange<u64>> {
        let mut generator = self.generator.lock().await;
        let db = generator.store().connection()?;
        let removed = navigation::delete_navigation_item(db, id).await?;
        Ok(after_navigation_change(&mut generator, removed).await)
    }

    /// Sets new positions for several entries in one transaction.
    pub async fn reorder_navigation(&self, order: &[(i64, i32)]) -> Result<NavigationChange<()>> {
        let mut generator = self.generator.lock().await;
        let db = generator.store().connection()?;
        navigation::reorder_navigation(db, order).await?;
        Ok(after_navigation_change(&mut generator, ()).await)
    }

    // Configuration

    /// Saves the setup form as the `site`, `github` and `content` records.
    pub async fn save_site_setup(&self, setup: SiteSetup) -> Result<()> {
        if setup.site_name.trim().is_empty() {
            return Err(Error::validation("Site name cannot be empty"));
        }

        let generator = self.generator.lock().await;
        let sections = [
            ("site", setup.site_section()),
            ("github", setup.github_section()),
            ("content", setup.content_section()),
        ];

        generator.documents().update_site_config(|doc| {
            for (name, value) in &sections {
                doc.insert((*name).to_string(), value.clone());
            }
        })?;

        let store = generator.store();
        for (name, value) in &sections {
            store_value(store, name, value).await?;
        }

        tracing::info!("Saved site setup for {}", setup.site_name.trim());
        Ok(())
    }

    /// Saves branding in the editor shape and refreshes the static assets.
    ///
    /// `site-config.json`, when it exists, gets the flat colour/font mirror.
    pub async fn save_branding(&self, branding: Value) -> Result<GenerationReport> {
        if !branding.is_object() {
            return Err(Error::validation("Branding must be a JSON object"));
        }

        let mut generator = self.generator.lock().await;
        let docs = generator.documents().clone();

        docs.write_branding_config(&branding)?;
        if docs.site_config_path().exists() {
            docs.set_site_section("branding", flatten_branding(&branding))?;
        }
        store_value(generator.store(), "branding", &branding).await?;

        tracing::info!("Saved branding");
        generator.refresh_static_assets().await
    }

    /// Makes `design` the active design system.
    pub async fn save_design(&self, design: DesignSettings) -> Result<()> {
        if design.system.trim().is_empty() {
            return Err(Error::validation("Design system name cannot be empty"));
        }

        let generator = self.generator.lock().await;
        let store = generator.store();
        if store.is_connected() {
            store.set_active_design(&design).await?;
        } else {
            tracing::warn!("Configuration store unavailable, design saved to JSON only");
        }

        generator
            .documents()
            .set_site_section("design", serde_json::to_value(&design)?)?;
        tracing::info!("Design system set to {}", design.system);
        Ok(())
    }

    /// Saves social accounts as given.
    pub async fn save_social(&self, social: Value) -> Result<()> {
        if !social.is_object() {
            return Err(Error::validation("Social accounts must be a JSON object"));
        }

        let generator = self.generator.lock().await;
        generator
            .documents()
            .set_site_section("social", social.clone())?;
        store_value(generator.store(), "social", &social).await?;
        tracing::info!("Saved social accounts");
        Ok(())
    }

    /// Saves category-scoped settings.
    pub async fn save_settings(&self, settings: SettingsMap) -> Result<()> {
        let generator = self.generator.lock().await;

        let section: Map<String, Value> = settings
            .iter()
            .map(|(category, values)| {
                let values: Map<String, Value> = values
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                (category.clone(), Value::Object(values))
            })
            .collect();
        generator
            .documents()
            .set_site_section("settings", Value::Object(section))?;

        let store = generator.store();
        if store.is_connected() {
            for (category, values) in &settings {
                for (key, value) in values {
                    store.set_setting(category, key, value).await?;
                }
            }
        } else {
            tracing::warn!("Configuration store unavailable, settings saved to JSON only");
        }

        tracing::info!("Saved {} settings categories", settings.len());
        Ok(())
    }
}

async fn store_value(store: &ConfigStore, key: &str, value: &Value) -> Result<()> {
    if !store.is_connected() {
        tracing::warn!("Configuration store unavailable, {} saved to JSON only", key);
        return Ok(());
    }
    store.set_value(key, value).await
}

async fn after_navigation_change<T>(
    generator: &mut SiteGenerator,
    value: T,
) -> NavigationChange<T> {
    let regeneration = match generator.regenerate_navigation().await {
        Ok(report) => report,
        Err(e) => GenerationReport {
            outcomes: vec![ArtifactOutcome::Failed {
                path: SITE_CONFIG_JS_PATH.to_string(),
                error: e.to_string(),
            }],
            success: false,
        },
    };
    if !regeneration.success {
        tracing::warn!("Navigation saved but {} was not regenerated", SITE_CONFIG_JS_PATH);
    }
    NavigationChange {
        value,
        regeneration,
    }
}
