//! Configuration resolution - One merged view of store, legacy JSON and defaults.
//!
//! Every field is resolved on its own, highest priority first:
//!
//! 1. the store record, when present and non-empty,
//! 2. the legacy JSON documents (`branding-config.json` ahead of the
//!    `branding` section of `site-config.json`),
//! 3. the built-in default.
//!
//! So a primary colour saved in the store can sit next to a font that still
//! comes from `branding-config.json`. Resolution never writes anything.
//!
//! A store that cannot be reached is not fatal: the failure is logged, the
//! store layer is skipped and [`ResolvedConfig::store_available`] is cleared.
//! The one store-side problem that *is* reported is a parent cycle in the
//! navigation table.

use crate::{
    core::{
        legacy::{LegacyDocuments, design_from_section},
        navigation::{self, NavigationNode},
        store::{ConfigStore, DesignSettings},
    },
    errors::Result,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Site name when nothing is configured
pub const DEFAULT_SITE_NAME: &str = "My Website";
/// Site description when nothing is configured
pub const DEFAULT_SITE_DESCRIPTION: &str = "A website built with ForgeWeb";
/// Footer author when nothing is configured
pub const DEFAULT_SITE_AUTHOR: &str = "Website Owner";
/// Placeholder public URL
pub const DEFAULT_SITE_URL: &str = "https://example.com";
/// CDN script of the default design
pub const DEFAULT_TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

/// Platforms always present in the social map, even without a handle
const STANDARD_PLATFORMS: [&str; 4] = ["twitter", "linkedin", "facebook", "github"];

/// Site identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteIdentity {
    /// Display name
    pub name: String,
    /// Public URL of the site
    pub url: String,
    /// Meta description
    pub description: String,
    /// Footer author
    pub author: String,
}

/// Brand colours, fonts and extras used by pages and `custom.css`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    /// Main brand colour
    pub primary_color: String,
    /// Secondary brand colour
    pub secondary_color: String,
    /// Highlight colour
    pub accent_color: String,
    /// Dark text and background colour
    pub dark_color: String,
    /// Light background colour
    pub light_color: String,
    /// Display font name used in page templates
    pub font: String,
    /// Body font key for `custom.css` (`system`, `inter`, `roboto`, ...)
    pub font_family: String,
    /// Stylesheet URL for a custom font
    pub custom_font_url: String,
    /// Radius key (`none`, `sm`, `md`, `lg`, `xl`, `full`)
    pub border_radius: String,
    /// Logo image path, empty for none
    pub logo_path: String,
    /// Extra CSS appended to `custom.css`
    #[serde(rename = "customCSS")]
    pub custom_css: String,
}

/// Which optional sections the site includes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentFlags {
    /// Generate `about.html`
    pub include_about: bool,
    /// Generate `contact.html`
    pub include_contact: bool,
    /// Link the blog
    pub include_blog: bool,
    /// Link the portfolio
    pub include_portfolio: bool,
    /// Link the services page
    pub include_services: bool,
    /// Fill pages with sample copy
    pub include_sample_content: bool,
}

impl Default for ContentFlags {
    fn default() -> Self {
        Self {
            include_about: true,
            include_contact: true,
            include_blog: true,
            include_portfolio: false,
            include_services: false,
            include_sample_content: true,
        }
    }
}

/// One published menu entry, shaped for `site-config.js`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    /// Link text
    pub title: String,
    /// Link target
    pub url: String,
    /// `_blank` for new-tab links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Extra CSS class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Nested entries
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavEntry>,
}

impl NavEntry {
    fn link(title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            target: None,
            class: None,
            children: Vec::new(),
        }
    }
}

impl From<NavigationNode> for NavEntry {
    fn from(node: NavigationNode) -> Self {
        Self {
            title: node.title,
            url: node.url,
            target: node.open_new_tab.then(|| "_blank".to_string()),
            class: (!node.css_class.is_empty()).then_some(node.css_class),
            children: node.children.into_iter().map(Into::into).collect(),
        }
    }
}

/// The merged configuration consumed by site generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    /// Name, URL, description and author
    pub site: SiteIdentity,
    /// Colours, fonts and extras
    pub branding: Branding,
    /// Active design system
    pub design: DesignSettings,
    /// Published menu
    pub navigation: Vec<NavEntry>,
    /// Platform name to handle
    pub social: BTreeMap<String, String>,
    /// Optional sections
    pub content: ContentFlags,
    /// False when the store could not be consulted for this resolution
    pub store_available: bool,
}

/// Flat branding keys, their nested `branding-config.json` location and the
/// default.
const BRANDING_FIELDS: [(&str, &[&str], &str); 11] = [
    ("primaryColor", &["colors", "primary"], "#1b5fa3"),
    ("secondaryColor", &["colors", "secondary"], "#144a84"),
    ("accentColor", &["colors", "accent"], "#f9943b"),
    ("darkColor", &["colors", "dark"], "#1F2937"),
    ("lightColor", &["colors", "light"], "#F3F4F6"),
    ("font", &["typography", "headingFont"], "Inter"),
    ("fontFamily", &["typography", "fontFamily"], "system"),
    ("customFontUrl", &["typography", "customFontUrl"], ""),
    ("borderRadius", &["typography", "borderRadius"], "md"),
    ("logoPath", &["assets", "logoPath"], ""),
    ("customCSS", &["customCSS"], ""),
];

/// A non-empty string at `path` inside `value`.
fn text_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |node, key| node.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// First non-empty text for `key` across `layers`.
fn first_text(layers: &[Option<&Value>], key: &str) -> Option<String> {
    layers
        .iter()
        .flatten()
        .find_map(|layer| text_at(layer, &[key]))
        .map(str::to_string)
}

/// Reads one branding field from a record in either the flat or nested shape.
fn branding_text<'a>(record: &'a Value, flat: &str, nested: &[&str]) -> Option<&'a str> {
    text_at(record, &[flat]).or_else(|| text_at(record, nested))
}

fn resolve_branding(layers: &[Option<&Value>]) -> Branding {
    let resolved: BTreeMap<&str, String> = BRANDING_FIELDS
        .iter()
        .map(|(flat, nested, default)| {
            let value = layers
                .iter()
                .flatten()
                .find_map(|layer| branding_text(layer, flat, nested))
                .unwrap_or(*default);
            (*flat, value.to_string())
        })
        .collect();

    let field = |key: &str| resolved.get(key).cloned().unwrap_or_default();
    Branding {
        primary_color: field("primaryColor"),
        secondary_color: field("secondaryColor"),
        accent_color: field("accentColor"),
        dark_color: field("darkColor"),
        light_color: field("lightColor"),
        font: field("font"),
        font_family: field("fontFamily"),
        custom_font_url: field("customFontUrl"),
        border_radius: field("borderRadius"),
        logo_path: field("logoPath"),
        custom_css: field("customCSS"),
    }
}

/// The flat `site-config.json` branding shape (colours and display font) for
/// a record in either shape, with defaults filled in.
#[must_use]
pub fn flatten_branding(record: &Value) -> Value {
    let flat: Map<String, Value> = BRANDING_FIELDS
        .iter()
        .take(6)
        .map(|(flat, nested, default)| {
            let value = branding_text(record, flat, nested).unwrap_or(*default);
            ((*flat).to_string(), Value::String(value.to_string()))
        })
        .collect();
    Value::Object(flat)
}

fn resolve_site(layers: &[Option<&Value>]) -> SiteIdentity {
    SiteIdentity {
        name: first_text(layers, "name").unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
        url: first_text(layers, "url").unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
        description: first_text(layers, "description")
            .unwrap_or_else(|| DEFAULT_SITE_DESCRIPTION.to_string()),
        author: first_text(layers, "author").unwrap_or_else(|| DEFAULT_SITE_AUTHOR.to_string()),
    }
}

fn resolve_content(layers: &[Option<&Value>]) -> ContentFlags {
    let flag = |key: &str, default: bool| {
        layers
            .iter()
            .flatten()
            .find_map(|layer| layer.get(key).and_then(Value::as_bool))
            .unwrap_or(default)
    };
    let defaults = ContentFlags::default();

    ContentFlags {
        include_about: flag("include_about", defaults.include_about),
        include_contact: flag("include_contact", defaults.include_contact),
        include_blog: flag("include_blog", defaults.include_blog),
        include_portfolio: flag("include_portfolio", defaults.include_portfolio),
        include_services: flag("include_services", defaults.include_services),
        include_sample_content: flag("include_sample_content", defaults.include_sample_content),
    }
}

/// Platform handles from a social record, accepting `{platforms: {...}}`,
/// a flat `{platform: {handle}}` map, or `{platform: "handle"}`.
fn social_handles(record: &Value) -> BTreeMap<String, String> {
    let platforms = record
        .get("platforms")
        .and_then(Value::as_object)
        .or_else(|| record.as_object());

    platforms
        .into_iter()
        .flatten()
        .filter_map(|(platform, entry)| {
            let handle = match entry {
                Value::String(handle) => Some(handle.as_str()),
                other => other.get("handle").and_then(Value::as_str),
            }?;
            Some((platform.clone(), handle.trim().to_string()))
        })
        .collect()
}

fn resolve_social(layers: &[Option<&Value>]) -> BTreeMap<String, String> {
    let mut social: BTreeMap<String, String> = STANDARD_PLATFORMS
        .iter()
        .map(|p| ((*p).to_string(), String::new()))
        .collect();

    // Lowest priority first so higher layers overwrite
    for layer in layers.iter().rev().flatten() {
        for (platform, handle) in social_handles(layer) {
            if !handle.is_empty() {
                social.insert(platform, handle);
            }
        }
    }
    social
}

/// Menu derived from the content flags when the store has no navigation.
#[must_use]
pub fn navigation_from_content(content: &ContentFlags) -> Vec<NavEntry> {
    let mut entries = vec![NavEntry::link("Home", "index.html")];
    let optional = [
        (content.include_about, "About", "about.html"),
        (content.include_services, "Services", "services.html"),
        (content.include_portfolio, "Portfolio", "portfolio.html"),
        (content.include_blog, "Blog", "blog.html"),
        (content.include_contact, "Contact", "contact.html"),
    ];
    entries.extend(
        optional
            .into_iter()
            .filter(|(enabled, _, _)| *enabled)
            .map(|(_, title, url)| NavEntry::link(title, url)),
    );
    entries
}

fn section<'a>(document: Option<&'a Map<String, Value>>, name: &str) -> Option<&'a Value> {
    document.and_then(|doc| doc.get(name))
}

/// Collects store reads, downgrading failures to "absent".
struct StoreReader<'a> {
    store: &'a ConfigStore,
    available: bool,
}

impl StoreReader<'_> {
    fn absorb<T>(&mut self, what: &str, result: Result<Option<T>>) -> Option<T> {
        match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Configuration store read of {} failed: {}", what, e);
                self.available = false;
                None
            }
        }
    }

    async fn value(&mut self, key: &str) -> Option<Value> {
        if !self.available {
            return None;
        }
        let result = self.store.get_value(key).await;
        self.absorb(key, result).filter(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        })
    }

    async fn design(&mut self) -> Option<DesignSettings> {
        if !self.available {
            return None;
        }
        let result = self.store.get_active_design().await;
        self.absorb("design", result)
    }

    async fn navigation(&mut self) -> Result<Vec<NavEntry>> {
        if !self.available {
            return Ok(Vec::new());
        }
        let items = match self.store.connection() {
            Ok(db) => navigation::list_navigation_items(db, false).await,
            Err(e) => Err(e),
        };
        let Some(items) = self.absorb("navigation", items.map(Some)) else {
            return Ok(Vec::new());
        };
        let tree = navigation::build_active_tree(&items)?;
        Ok(tree.into_iter().map(Into::into).collect())
    }
}

/// Resolves [`ResolvedConfig`] from a store and the legacy documents.
#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver<'a> {
    store: &'a ConfigStore,
    docs: &'a LegacyDocuments,
}

impl<'a> ConfigResolver<'a> {
    /// Reads from `store` first, then `docs`.
    #[must_use]
    pub const fn new(store: &'a ConfigStore, docs: &'a LegacyDocuments) -> Self {
        Self { store, docs }
    }

    /// Builds the merged configuration.
    ///
    /// # Errors
    /// Returns `Error::NavigationCycle` if the stored navigation tree loops.
    /// Every other store failure falls back to the JSON and default layers.
    pub async fn resolve(&self) -> Result<ResolvedConfig> {
        let mut reader = StoreReader {
            store: self.store,
            available: self.store.is_connected(),
        };
        if !reader.available {
            tracing::warn!("Configuration store unavailable, resolving from JSON documents");
        }

        let stored_site = reader.value("site").await;
        let stored_branding = reader.value("branding").await;
        let stored_social = reader.value("social").await;
        let stored_content = reader.value("content").await;
        let stored_design = reader.design().await;
        let stored_navigation = reader.navigation().await?;

        let site_config = self.docs.site_config();
        let branding_config = self.docs.branding_config().map(Value::Object);
        let legacy = site_config.as_ref();

        let site = resolve_site(&[stored_site.as_ref(), section(legacy, "site")]);
        let branding = resolve_branding(&[
            stored_branding.as_ref(),
            branding_config.as_ref(),
            section(legacy, "branding"),
        ]);
        let content = resolve_content(&[stored_content.as_ref(), section(legacy, "content")]);
        let social = resolve_social(&[stored_social.as_ref(), section(legacy, "social")]);

        let design = stored_design
            .or_else(|| section(legacy, "design").map(design_from_section))
            .unwrap_or_else(default_design);

        let navigation = if stored_navigation.is_empty() {
            navigation_from_content(&content)
        } else {
            stored_navigation
        };

        Ok(ResolvedConfig {
            site,
            branding,
            design,
            navigation,
            social,
            content,
            store_available: reader.available,
        })
    }
}

/// Tailwind from its CDN.
#[must_use]
pub fn default_design() -> DesignSettings {
    DesignSettings {
        system: "tailwind".to_string(),
        cdn_urls: vec![DEFAULT_TAILWIND_CDN.to_string()],
        body_classes: String::new(),
        custom_css: String::new(),
    }
}

/// Convenience wrapper around [`ConfigResolver::resolve`].
pub async fn resolve_config(store: &ConfigStore, docs: &LegacyDocuments) -> Result<ResolvedConfig> {
    ConfigResolver::new(store, docs).resolve().await
}
