//! Core logic - Configuration storage, resolution and static site generation
//!
//! Everything here is independent of how operator requests arrive; an HTTP
//! layer only has to map verbs and paths onto [`admin::SiteAdmin`].

/// Operator actions serialized behind one lock
pub mod admin;
/// Static file rendering and writing
pub mod generator;
/// Legacy `site-config.json` / `branding-config.json` documents
pub mod legacy;
/// Navigation tree CRUD, ordering and cascading deletes
pub mod navigation;
/// Store > JSON > default configuration merge
pub mod resolver;
/// Key/value records, settings and the active design
pub mod store;
/// `{{NAME}}` and `{{#NAME}}...{{/NAME}}` substitution
pub mod template;
