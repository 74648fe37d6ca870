//! Validator settings and layered settings loading.
//!
//! This crate owns the settings model (rate lookup endpoint, restricted rate
//! labels, siting bounds), its schema checks, and the layer-merging logic used
//! by the validator and the command-line tool.

mod error;
mod loader;
mod model;

/// Public error type returned by settings loading and validation APIs.
pub use error::ConfigError;
/// Layered settings types and loader options.
pub use loader::{LayeredSettings, LayeredSettingsOptions, SettingsLayer, SettingsLayerSource};
/// Settings models.
pub use model::*;
