/// Application settings loading from forgeweb.toml
pub mod app;

/// Database configuration and connection management
pub mod database;
