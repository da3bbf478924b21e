//! Site generation - Renders the resolved configuration into static files.
//!
//! A generation pass moves through
//! `Idle → ResolvingConfig → RenderingAssets → WritingFiles → Done`, or ends
//! in `Failed`. Only a failure to resolve the configuration aborts the pass.
//! Problems with individual artifacts are collected in the
//! [`GenerationReport`] and the remaining artifacts are still written;
//! nothing already written is rolled back.
//!
//! Output is a pure function of the resolved configuration, the templates and
//! the copyright year, so regenerating with unchanged inputs rewrites
//! byte-identical files.

use crate::{
    config::app::AppConfig,
    core::{
        legacy::LegacyDocuments,
        resolver::{Branding, NavEntry, ResolvedConfig, resolve_config},
        store::ConfigStore,
        template::{TemplateVars, escape_html, render},
    },
    errors::Result,
};
use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use std::path::{Path, PathBuf};

const BASE_TEMPLATE: &str = include_str!("../../static/base.html");
const HOME_CONTENT: &str = include_str!("../../static/home-content.html");
const ABOUT_CONTENT: &str = include_str!("../../static/about-content.html");
const CONTACT_CONTENT: &str = include_str!("../../static/contact-content.html");
const CUSTOM_CSS_TEMPLATE: &str = include_str!("../../static/custom.css");
const SITE_CONFIG_TEMPLATE: &str = include_str!("../../static/site-config.js");
const SITE_JS: &str = include_str!("../../static/site.js");

/// Brand stylesheet, relative to the website root
pub const CUSTOM_CSS_PATH: &str = "assets/css/custom.css";
/// Client-side behaviour script
pub const SITE_JS_PATH: &str = "assets/js/site.js";
/// `SITE_CONFIG` object with navigation and social handles
pub const SITE_CONFIG_JS_PATH: &str = "assets/js/site-config.js";
/// Crawler rules
pub const ROBOTS_PATH: &str = "robots.txt";
/// One `<url>` per written page
pub const SITEMAP_PATH: &str = "sitemap.xml";

/// Where a generation pass currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    /// No pass has run yet
    Idle,
    /// Merging store, JSON documents and defaults
    ResolvingConfig,
    /// Filling templates
    RenderingAssets,
    /// Writing artifacts under the website root
    WritingFiles,
    /// Every artifact was written
    Done,
    /// Configuration could not be resolved, or an artifact failed
    Failed,
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ResolvingConfig => "resolving config",
            Self::RenderingAssets => "rendering assets",
            Self::WritingFiles => "writing files",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What happened to one output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ArtifactOutcome {
    /// The file is on disk
    Written {
        /// Path relative to the website root
        path: String,
    },
    /// Rendering or writing failed
    Failed {
        /// Path relative to the website root
        path: String,
        /// Why the artifact is missing
        error: String,
    },
}

impl ArtifactOutcome {
    /// Path of the artifact, relative to the website root
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Written { path } | Self::Failed { path, .. } => path,
        }
    }
}

/// Per-artifact result of a generation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// One entry per artifact, in write order
    pub outcomes: Vec<ArtifactOutcome>,
    /// True when every artifact was written
    pub success: bool,
}

impl GenerationReport {
    fn from_outcomes(outcomes: Vec<ArtifactOutcome>) -> Self {
        let success = outcomes
            .iter()
            .all(|o| matches!(o, ArtifactOutcome::Written { .. }));
        Self { outcomes, success }
    }

    /// Relative paths written successfully, in write order
    #[must_use]
    pub fn written(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ArtifactOutcome::Written { .. }))
            .map(ArtifactOutcome::path)
            .collect()
    }

    /// `(path, error)` for every artifact that failed
    #[must_use]
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ArtifactOutcome::Failed { path, error } => Some((path.as_str(), error.as_str())),
                ArtifactOutcome::Written { .. } => None,
            })
            .collect()
    }
}

/// One HTML page of the generated site
struct Page {
    file: &'static str,
    template: &'static str,
    builtin: &'static str,
}

static HOME_PAGE: Page = Page {
    file: "index.html",
    template: "home-content.html",
    builtin: HOME_CONTENT,
};
static ABOUT_PAGE: Page = Page {
    file: "about.html",
    template: "about-content.html",
    builtin: ABOUT_CONTENT,
};
static CONTACT_PAGE: Page = Page {
    file: "contact.html",
    template: "contact-content.html",
    builtin: CONTACT_CONTENT,
};

/// A rendered file waiting to be written, or the reason it could not be
/// rendered
struct Artifact {
    path: String,
    contents: Result<String>,
}

impl Artifact {
    fn new(path: impl Into<String>, contents: Result<String>) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

/// Renders and writes the static site
#[derive(Debug)]
pub struct SiteGenerator {
    store: ConfigStore,
    docs: LegacyDocuments,
    website_root: PathBuf,
    templates_dir: Option<PathBuf>,
    year: i32,
    state: GenerationState,
}

impl SiteGenerator {
    /// Creates a generator writing under `config.website_root`.
    #[must_use]
    pub fn new(config: &AppConfig, store: ConfigStore) -> Self {
        Self {
            store,
            docs: LegacyDocuments::from_config(config),
            website_root: config.website_root.clone(),
            templates_dir: config.templates_dir.clone(),
            year: Utc::now().year(),
            state: GenerationState::Idle,
        }
    }

    /// Fixes the copyright year instead of taking it from the clock.
    #[must_use]
    pub const fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    /// State reached by the most recent pass
    #[must_use]
    pub const fn state(&self) -> GenerationState {
        self.state
    }

    /// Directory the site is written to
    #[must_use]
    pub fn website_root(&self) -> &Path {
        &self.website_root
    }

    /// Store the configuration is read from
    #[must_use]
    pub const fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Legacy JSON documents read alongside the store
    #[must_use]
    pub const fn documents(&self) -> &LegacyDocuments {
        &self.docs
    }

    fn transition(&mut self, next: GenerationState) {
        tracing::debug!("Site generation: {} -> {}", self.state, next);
        self.state = next;
    }

    async fn resolve(&mut self) -> Result<ResolvedConfig> {
        self.transition(GenerationState::ResolvingConfig);
        match resolve_config(&self.store, &self.docs).await {
            Ok(resolved) => Ok(resolved),
            Err(e) => {
                tracing::error!("Could not resolve site configuration: {}", e);
                self.transition(GenerationState::Failed);
                Err(e)
            }
        }
    }

    /// Runs a full generation pass.
    ///
    /// # Errors
    /// Fails only if the configuration cannot be resolved. Artifact failures
    /// are reported in the returned [`GenerationReport`].
    pub async fn generate_site(&mut self) -> Result<GenerationReport> {
        let resolved = self.resolve().await?;

        self.transition(GenerationState::RenderingAssets);
        let pages: Vec<Artifact> = self
            .pages_for(&resolved)
            .into_iter()
            .map(|page| Artifact::new(page.file, self.render_page(page, &resolved)))
            .collect();
        let mut assets = self.static_assets(&resolved);
        assets.push(Artifact::new(ROBOTS_PATH, Ok(robots_txt(&resolved.site.url))));

        // Pages go first so the sitemap lists only the ones that reached disk
        self.transition(GenerationState::WritingFiles);
        let mut outcomes = self.write_artifacts(pages);
        let published: Vec<&str> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ArtifactOutcome::Written { path } => Some(path.as_str()),
                ArtifactOutcome::Failed { .. } => None,
            })
            .collect();
        let sitemap = sitemap_xml(&resolved.site.url, &published);
        assets.push(Artifact::new(SITEMAP_PATH, Ok(sitemap)));
        outcomes.extend(self.write_artifacts(assets));

        let report = self.finish(outcomes);
        tracing::info!(
            "Generated site in {}: {} written, {} failed",
            self.website_root.display(),
            report.written().len(),
            report.failures().len()
        );
        Ok(report)
    }

    /// Rewrites only `site-config.js`, after a navigation change.
    pub async fn regenerate_navigation(&mut self) -> Result<GenerationReport> {
        let resolved = self.resolve().await?;
        self.transition(GenerationState::RenderingAssets);
        let artifact = Artifact::new(SITE_CONFIG_JS_PATH, render_site_config_js(&resolved));
        Ok(self.write_all(vec![artifact]))
    }

    /// Rewrites `custom.css`, `site.js` and `site-config.js`, after a
    /// branding change.
    pub async fn refresh_static_assets(&mut self) -> Result<GenerationReport> {
        let resolved = self.resolve().await?;
        self.transition(GenerationState::RenderingAssets);
        let artifacts = self.static_assets(&resolved);
        Ok(self.write_all(artifacts))
    }

    fn pages_for(&self, resolved: &ResolvedConfig) -> Vec<&'static Page> {
        let mut pages = vec![&HOME_PAGE];
        if resolved.content.include_about {
            pages.push(&ABOUT_PAGE);
        }
        if resolved.content.include_contact {
            pages.push(&CONTACT_PAGE);
        }
        pages
    }

    fn static_assets(&self, resolved: &ResolvedConfig) -> Vec<Artifact> {
        vec![
            Artifact::new(CUSTOM_CSS_PATH, Ok(render_custom_css(&resolved.branding))),
            Artifact::new(SITE_JS_PATH, Ok(SITE_JS.to_string())),
            Artifact::new(SITE_CONFIG_JS_PATH, render_site_config_js(resolved)),
        ]
    }

    fn write_all(&mut self, artifacts: Vec<Artifact>) -> GenerationReport {
        self.transition(GenerationState::WritingFiles);
        let outcomes = self.write_artifacts(artifacts);
        self.finish(outcomes)
    }

    fn write_artifacts(&self, artifacts: Vec<Artifact>) -> Vec<ArtifactOutcome> {
        artifacts
            .into_iter()
            .map(|artifact| {
                let written = artifact.contents.and_then(|contents| {
                    write_artifact(&self.website_root, &artifact.path, &contents)
                });
                match written {
                    Ok(()) => ArtifactOutcome::Written {
                        path: artifact.path,
                    },
                    Err(e) => {
                        tracing::warn!("Failed to generate {}: {}", artifact.path, e);
                        ArtifactOutcome::Failed {
                            path: artifact.path,
                            error: e.to_string(),
                        }
                    }
                }
            })
            .collect()
    }

    fn finish(&mut self, outcomes: Vec<ArtifactOutcome>) -> GenerationReport {
        let report = GenerationReport::from_outcomes(outcomes);
        self.transition(if report.success {
            GenerationState::Done
        } else {
            GenerationState::Failed
        });
        report
    }

    /// Loads `name` from the templates directory, falling back to the
    /// built-in copy.
    fn template(&self, name: &str, builtin: &'static str) -> Result<String> {
        let Some(dir) = &self.templates_dir else {
            return Ok(builtin.to_string());
        };
        let path = dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(builtin.to_string()),
            Err(e) => Err(e.into()),
        }
    }

    fn render_page(&self, page: &Page, resolved: &ResolvedConfig) -> Result<String> {
        let base = self.template("base.html", BASE_TEMPLATE)?;
        let content_template = self.template(page.template, page.builtin)?;

        let mut vars = site_vars(resolved, self.year);
        let content = render(&content_template, &vars);

        let name = &resolved.site.name;
        let (title, description) = match page.file {
            "about.html" => (format!("About - {name}"), format!("Learn more about {name}")),
            "contact.html" => (format!("Contact - {name}"), format!("Contact {name}")),
            _ => (name.clone(), resolved.site.description.clone()),
        };
        vars.insert("SITE_TITLE".into(), Value::String(escape_html(&title)));
        vars.insert(
            "PAGE_DESCRIPTION".into(),
            Value::String(escape_html(&description)),
        );
        vars.insert(
            "PAGE_URL".into(),
            Value::String(escape_html(&page_url(&resolved.site.url, page.file))),
        );
        vars.insert("CONTENT".into(), Value::String(content));

        Ok(render(&base, &vars))
    }
}

fn write_artifact(root: &Path, relative: &str, contents: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, contents)?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Variables shared by every page and content template.
fn site_vars(resolved: &ResolvedConfig, year: i32) -> TemplateVars {
    let site = &resolved.site;
    let branding = &resolved.branding;
    let design = &resolved.design;
    let content = &resolved.content;

    let vars = json!({
        "SITE_NAME": escape_html(&site.name),
        "SITE_DESCRIPTION": escape_html(&site.description),
        "SITE_AUTHOR": escape_html(&site.author),
        "SITE_URL": escape_html(&site.url),
        "CURRENT_YEAR": year,
        "NAV_LINKS": nav_links_html(&resolved.navigation),
        "SOCIAL_LINKS": social_links_html(resolved),
        "LOGO_PATH": escape_html(&branding.logo_path),
        "FAVICON_PATH": "favicon.ico",
        "CUSTOM_CSS_PATH": CUSTOM_CSS_PATH,
        "CDN_TAGS": cdn_tags(&design.cdn_urls),
        "BODY_CLASSES": escape_html(&design.body_classes),
        "DESIGN_CSS": design.custom_css,
        "BRAND_PRIMARY_COLOR": branding.primary_color,
        "BRAND_SECONDARY_COLOR": branding.secondary_color,
        "BRAND_ACCENT_COLOR": branding.accent_color,
        "BRAND_DARK_COLOR": branding.dark_color,
        "BRAND_LIGHT_COLOR": branding.light_color,
        "BRAND_FONT": branding.font,
        "INCLUDE_ABOUT": content.include_about,
        "INCLUDE_CONTACT": content.include_contact,
        "INCLUDE_BLOG": content.include_blog,
        "INCLUDE_PORTFOLIO": content.include_portfolio,
        "INCLUDE_SERVICES": content.include_services,
        "INCLUDE_SAMPLE_CONTENT": content.include_sample_content,
    });

    match vars {
        Value::Object(map) => map.into_iter().collect(),
        _ => TemplateVars::new(),
    }
}

fn page_url(site_url: &str, file: &str) -> String {
    let root = site_url.trim_end_matches('/');
    if file == "index.html" {
        root.to_string()
    } else {
        format!("{root}/{file}")
    }
}

fn nav_link(entry: &NavEntry, extra_class: &str) -> String {
    let mut class = format!("nav-link{extra_class}");
    if let Some(custom) = &entry.class {
        class.push(' ');
        class.push_str(custom);
    }
    let target = match &entry.target {
        Some(target) => format!(r#" target="{}" rel="noopener""#, escape_html(target)),
        None => String::new(),
    };
    format!(
        r#"<a href="{}" class="{}"{}>{}</a>"#,
        escape_html(&entry.url),
        escape_html(&class),
        target,
        escape_html(&entry.title)
    )
}

/// Menu markup; children follow their parent with a `nav-child` class.
fn nav_links_html(entries: &[NavEntry]) -> String {
    fn push_entries(entries: &[NavEntry], depth: usize, lines: &mut Vec<String>) {
        for entry in entries {
            let extra = if depth == 0 { "" } else { " nav-child" };
            lines.push(format!("                    {}", nav_link(entry, extra)));
            push_entries(&entry.children, depth + 1, lines);
        }
    }

    let mut lines = Vec::new();
    push_entries(entries, 0, &mut lines);
    lines.join("\n")
}

fn social_links_html(resolved: &ResolvedConfig) -> String {
    resolved
        .social
        .iter()
        .filter(|(_, handle)| !handle.is_empty())
        .map(|(platform, handle)| {
            format!(
                "                    <li><strong>{}:</strong> {}</li>",
                escape_html(platform),
                escape_html(handle)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<link>` for stylesheets, `<script>` for everything else.
fn cdn_tags(urls: &[String]) -> String {
    urls.iter()
        .map(|url| {
            let path = url.split(['?', '#']).next().unwrap_or_default();
            if path.ends_with(".css") {
                format!(r#"    <link rel="stylesheet" href="{}">"#, escape_html(url))
            } else {
                format!(r#"    <script src="{}"></script>"#, escape_html(url))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// CSS for the body font setting.
fn font_css(branding: &Branding) -> String {
    let google = |family: &str, query: &str| {
        format!(
            "@import url('https://fonts.googleapis.com/css2?family={query}&display=swap');\n\
             body {{ font-family: '{family}', system-ui, sans-serif; }}"
        )
    };

    match branding.font_family.as_str() {
        "custom" if !branding.custom_font_url.is_empty() => format!(
            "@import url('{}');\nbody {{ font-family: 'Custom Font', system-ui, sans-serif; }}",
            branding.custom_font_url
        ),
        "inter" => google("Inter", "Inter:wght@300;400;500;600;700"),
        "roboto" => google("Roboto", "Roboto:wght@300;400;500;700"),
        "opensans" => google("Open Sans", "Open+Sans:wght@300;400;500;600;700"),
        "lato" => google("Lato", "Lato:wght@300;400;700"),
        "montserrat" => google("Montserrat", "Montserrat:wght@300;400;500;600;700"),
        _ => "body { font-family: system-ui, -apple-system, sans-serif; }".to_string(),
    }
}

fn border_radius(setting: &str) -> &'static str {
    match setting {
        "none" => "0px",
        "sm" => "4px",
        "lg" => "12px",
        "xl" => "16px",
        "full" => "50%",
        _ => "8px",
    }
}

fn render_custom_css(branding: &Branding) -> String {
    let vars: TemplateVars = [
        ("BRAND_PRIMARY_COLOR", branding.primary_color.clone()),
        ("BRAND_SECONDARY_COLOR", branding.secondary_color.clone()),
        ("BRAND_ACCENT_COLOR", branding.accent_color.clone()),
        ("BRAND_DARK_COLOR", branding.dark_color.clone()),
        ("BRAND_LIGHT_COLOR", branding.light_color.clone()),
        ("FONT_CSS", font_css(branding)),
        ("BORDER_RADIUS", border_radius(&branding.border_radius).to_string()),
        ("CUSTOM_CSS", branding.custom_css.clone()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), Value::String(v)))
    .collect();

    render(CUSTOM_CSS_TEMPLATE, &vars)
}

fn render_site_config_js(resolved: &ResolvedConfig) -> Result<String> {
    let vars: TemplateVars = [
        ("SITE_NAME_JSON", serde_json::to_string(&resolved.site.name)?),
        ("SITE_URL_JSON", serde_json::to_string(&resolved.site.url)?),
        (
            "SITE_DESCRIPTION_JSON",
            serde_json::to_string(&resolved.site.description)?,
        ),
        (
            "NAVIGATION_JSON",
            serde_json::to_string_pretty(&resolved.navigation)?,
        ),
        ("SOCIAL_JSON", serde_json::to_string_pretty(&resolved.social)?),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), Value::String(v)))
    .collect();

    Ok(render(SITE_CONFIG_TEMPLATE, &vars))
}

fn robots_txt(site_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n",
        site_url.trim_end_matches('/')
    )
}

fn sitemap_xml(site_url: &str, pages: &[&str]) -> String {
    let entries: Vec<String> = pages
        .iter()
        .filter(|file| file.ends_with(".html"))
        .map(|file| {
            format!(
                "  <url><loc>{}</loc><changefreq>weekly</changefreq></url>",
                escape_html(&page_url(site_url, file))
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
         {}\n\
         </urlset>\n",
        entries.join("\n")
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::navigation::{NewNavigationItem, add_navigation_item};
    use crate::errors::Error;
    use crate::test_utils::*;
    use std::collections::BTreeMap;

    fn generator(config: &AppConfig, store: ConfigStore) -> SiteGenerator {
        SiteGenerator::new(config, store).with_year(2026)
    }

    fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
        fn walk(dir: &Path, root: &Path, files: &mut BTreeMap<String, Vec<u8>>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(&path, root, files);
                } else {
                    let key = path.strip_prefix(root).unwrap().display().to_string();
                    files.insert(key, std::fs::read(&path).unwrap());
                }
            }
        }
        let mut files = BTreeMap::new();
        walk(root, root, &mut files);
        files
    }

    #[tokio::test]
    async fn test_generate_writes_full_artifact_set() -> Result<()> {
        let (_dir, config) = setup_test_site()?;
        let mut generator = generator(&config, setup_test_store().await?);
        assert_eq!(generator.state(), GenerationState::Idle);

        let report = generator.generate_site().await?;

        assert!(report.success);
        assert_eq!(
            report.written(),
            vec![
                "index.html",
                "about.html",
                "contact.html",
                CUSTOM_CSS_PATH,
                SITE_JS_PATH,
                SITE_CONFIG_JS_PATH,
                ROBOTS_PATH,
                SITEMAP_PATH,
            ]
        );
        for path in report.written() {
            assert!(config.website_root.join(path).is_file(), "{path} missing");
        }
        assert_eq!(generator.state(), GenerationState::Done);

        let index = std::fs::read_to_string(config.website_root.join("index.html"))?;
        assert!(index.contains("<title>My Website</title>"));
        assert!(index.contains("&copy; 2026 Website Owner"));
        assert!(index.contains(r#"<script src="https://cdn.tailwindcss.com"></script>"#));
        assert!(index.contains(r#"href="about.html""#));
        assert!(!index.contains("{{"));

        let robots = std::fs::read_to_string(config.website_root.join(ROBOTS_PATH))?;
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
        Ok(())
    }

    #[tokio::test]
    async fn test_content_flags_gate_pages_and_sitemap() -> Result<()> {
        let (_dir, config) = setup_test_site()?;
        write_json(
            &config.site_config_path(),
            &json!({
                "site": {"url": "https://acme.github.io/site"},
                "content": {"include_about": false, "include_contact": true}
            }),
        )?;
        let mut generator = generator(&config, setup_test_store().await?);

        let report = generator.generate_site().await?;

        assert!(report.written().contains(&"contact.html"));
        assert!(!report.written().contains(&"about.html"));
        assert!(config.website_root.join("contact.html").exists());
        assert!(!config.website_root.join("about.html").exists());

        let sitemap = std::fs::read_to_string(config.website_root.join(SITEMAP_PATH))?;
        assert!(sitemap.contains("<loc>https://acme.github.io/site/contact.html</loc>"));
        assert!(sitemap.contains("<loc>https://acme.github.io/site</loc>"));
        assert!(!sitemap.contains("about.html"));
        Ok(())
    }

    #[tokio::test]
    async fn test_regeneration_is_byte_identical() -> Result<()> {
        let (_dir, config) = setup_test_site()?;
        let store = setup_test_store().await?;
        create_test_nav_item(store.connection()?, "Home", 0).await?;
        let mut generator = generator(&config, store);

        generator.generate_site().await?;
        let first = snapshot(&config.website_root);
        generator.generate_site().await?;
        let second = snapshot(&config.website_root);

        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn test_regenerate_navigation_only_touches_site_config_js() -> Result<()> {
        let (_dir, config) = setup_test_site()?;
        let store = setup_test_store().await?;
        let mut generator = generator(&config, store.clone());
        generator.generate_site().await?;

        let index_path = config.website_root.join("index.html");
        std::fs::write(&index_path, "sentinel")?;
        add_navigation_item(
            store.connection()?,
            NewNavigationItem::new("Pricing", "pricing.html"),
        )
        .await?;

        let report = generator.regenerate_navigation().await?;

        assert_eq!(report.written(), vec![SITE_CONFIG_JS_PATH]);
        assert_eq!(std::fs::read_to_string(&index_path)?, "sentinel");
        let js = std::fs::read_to_string(config.website_root.join(SITE_CONFIG_JS_PATH))?;
        assert!(js.contains(r#""title": "Pricing""#));
        assert!(js.contains(r#""url": "pricing.html""#));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_artifact_does_not_stop_the_pass() -> Result<()> {
        let (_dir, config) = setup_test_site()?;
        // A directory where robots.txt should go makes that single write fail
        std::fs::create_dir_all(config.website_root.join(ROBOTS_PATH))?;
        let mut generator = generator(&config, setup_test_store().await?);

        let report = generator.generate_site().await?;

        assert!(!report.success);
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, ROBOTS_PATH);
        assert!(report.written().contains(&SITEMAP_PATH));
        assert!(config.website_root.join(SITEMAP_PATH).is_file());
        assert!(config.website_root.join("index.html").is_file());
        assert_eq!(generator.state(), GenerationState::Failed);
        Ok(())
    }

    #[tokio::test]
    async fn test_sitemap_skips_page_that_failed_to_write() -> Result<()> {
        let (_dir, config) = setup_test_site()?;
        write_json(
            &config.site_config_path(),
            &json!({"site": {"url": "https://example.com"}}),
        )?;
        std::fs::create_dir_all(config.website_root.join("contact.html"))?;
        let mut generator = generator(&config, setup_test_store().await?);

        let report = generator.generate_site().await?;

        assert!(!report.success);
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "contact.html");
        assert!(report.written().contains(&SITEMAP_PATH));

        let sitemap = std::fs::read_to_string(config.website_root.join(SITEMAP_PATH))?;
        assert!(sitemap.contains("<loc>https://example.com/about.html</loc>"));
        assert!(!sitemap.contains("contact.html"));
        assert_eq!(sitemap.matches("<url>").count(), 2);
        assert_eq!(generator.state(), GenerationState::Failed);
        Ok(())
    }

    #[tokio::test]
    async fn test_templates_directory_overrides_builtins() -> Result<()> {
        let (dir, mut config) = setup_test_site()?;
        let templates = dir.path().join("templates");
        std::fs::create_dir_all(&templates)?;
        std::fs::write(
            templates.join("base.html"),
            "<html><title>{{SITE_TITLE}}</title>{{CONTENT}}</html>",
        )?;
        std::fs::write(templates.join("home-content.html"), "<p>{{SITE_NAME}}</p>")?;
        config.templates_dir = Some(templates);

        let mut generator = generator(&config, setup_test_store().await?);
        generator.generate_site().await?;

        let index = std::fs::read_to_string(config.website_root.join("index.html"))?;
        assert_eq!(index, "<html><title>My Website</title><p>My Website</p></html>");
        // No about-content.html override, so the built-in content is used
        let about = std::fs::read_to_string(config.website_root.join("about.html"))?;
        assert!(about.starts_with("<html><title>About - My Website</title>"));
        assert!(about.contains("About My Website"));
        Ok(())
    }

    #[tokio::test]
    async fn test_custom_css_reflects_branding() -> Result<()> {
        let (_dir, config) = setup_test_site()?;
        let store = setup_test_store().await?;
        store
            .set_value(
                "branding",
                &json!({
                    "colors": {"primary": "#ff0000", "dark": "#000000"},
                    "typography": {"fontFamily": "roboto", "borderRadius": "lg"},
                    "customCSS": ".hero { padding: 0; }"
                }),
            )
            .await?;
        let mut generator = generator(&config, store);

        let report = generator.refresh_static_assets().await?;

        assert_eq!(
            report.written(),
            vec![CUSTOM_CSS_PATH, SITE_JS_PATH, SITE_CONFIG_JS_PATH]
        );
        let css = std::fs::read_to_string(config.website_root.join(CUSTOM_CSS_PATH))?;
        assert!(css.contains("--brand-primary: #ff0000;"));
        assert!(css.contains("--brand-secondary: #144a84;"));
        assert!(css.contains("--brand-dark: #000000;"));
        assert!(css.contains("font-family: 'Roboto'"));
        assert!(css.contains("border-radius: 12px;"));
        assert!(css.contains(".hero { padding: 0; }"));
        assert!(!config.website_root.join("index.html").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_navigation_cycle_fails_generation() -> Result<()> {
        use crate::entities::navigation as nav_entity;
        use sea_orm::{ActiveModelTrait, EntityTrait, Set};

        let (_dir, config) = setup_test_site()?;
        let store = setup_test_store().await?;
        let db = store.connection()?;
        let a = create_test_nav_item(db, "A", 0).await?;
        let b = add_navigation_item(db, NewNavigationItem::new("B", "b.html").under(a.id)).await?;
        let mut corrupt: nav_entity::ActiveModel = nav_entity::Entity::find_by_id(a.id)
            .one(db)
            .await?
            .unwrap()
            .into();
        corrupt.parent_id = Set(Some(b.id));
        corrupt.update(db).await?;

        let mut generator = generator(&config, store);
        let result = generator.generate_site().await;

        assert!(matches!(result, Err(Error::NavigationCycle { .. })));
        assert_eq!(generator.state(), GenerationState::Failed);
        assert!(!config.website_root.join("index.html").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_generation_without_store() -> Result<()> {
        let (_dir, config) = setup_test_site()?;
        write_json(&config.site_config_path(), &json!({"site": {"name": "Offline & Co"}}))?;
        let mut generator = generator(&config, ConfigStore::unavailable());

        let report = generator.generate_site().await?;

        assert!(report.success);
        let index = std::fs::read_to_string(config.website_root.join("index.html"))?;
        assert!(index.contains("<title>Offline &amp; Co</title>"));
        let js = std::fs::read_to_string(config.website_root.join(SITE_CONFIG_JS_PATH))?;
        assert!(js.contains(r#"siteName: "Offline & Co""#));
        Ok(())
    }

    #[test]
    fn test_sitemap_and_cdn_helpers() {
        let sitemap = sitemap_xml("https://example.com/", &["index.html", "about.html"]);
        assert!(sitemap.contains("<loc>https://example.com</loc>"));
        assert!(sitemap.contains("<loc>https://example.com/about.html</loc>"));
        assert_eq!(sitemap.matches("<url>").count(), 2);

        let tags = cdn_tags(&[
            "https://cdn.example.com/b.min.css?v=5".to_string(),
            "https://cdn.tailwindcss.com".to_string(),
        ]);
        assert!(
            tags.contains(
                r#"<link rel="stylesheet" href="https://cdn.example.com/b.min.css?v=5">"#
            )
        );
        assert!(tags.contains(r#"<script src="https://cdn.tailwindcss.com"></script>"#));
        assert_eq!(border_radius("unknown"), "8px");
    }
}
