//! Configuration-driven menus for the GeoNode client.
//!
//! This crate loads the `geoNodeConfiguration` menu trees, evaluates their
//! visibility conditions against a monitored slice of the application state,
//! and projects each tree to the items the current session may see.

pub mod expression;
pub mod menu;
pub mod state;

mod error;
mod projection;
mod selector;

pub use error::{ConfigError, ConfigResult};
pub use menu::LoadMode;
pub use projection::{
    evaluate_condition, get_custom_menu_filters, get_parsed_configuration, LocalConfig, MenuConfiguration,
    ParsedConfiguration, TreeName,
};
pub use selector::ConfigurationSelector;
