//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod design_config;
pub mod navigation;
pub mod setting;
pub mod site_config;

// Re-export specific types to avoid conflicts
pub use design_config::{
    Column as DesignConfigColumn, Entity as DesignConfig, Model as DesignConfigModel,
};
pub use navigation::{Column as NavigationColumn, Entity as Navigation, Model as NavigationModel};
pub use setting::{Column as SettingColumn, Entity as Setting, Model as SettingModel};
pub use site_config::{Column as SiteConfigColumn, Entity as SiteConfig, Model as SiteConfigModel};
