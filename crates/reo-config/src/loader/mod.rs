//! Layered settings loader.
//!
//! Discovers settings layers (system/user/cwd/runtime), checks each against
//! the settings schema, merges them in precedence order, and produces the
//! final `ValidatorSettings`.

mod layer_io;
mod merge;
mod schema;


use crate::{ConfigError, ValidatorSettings};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default settings filename in local layers.
const DEFAULT_SETTINGS_FILE: &str = "reo.json5";
/// Default settings directory under the user's home.
const DEFAULT_SETTINGS_DIR: &str = ".reo";

#[cfg(unix)]
/// Default system settings path on Unix.
const SYSTEM_SETTINGS_PATH: &str = "/etc/reo/reo.json5";

/// Effective settings plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredSettings {
    /// The merged, validated settings.
    pub settings: ValidatorSettings,
    /// Metadata for each layer that contributed.
    pub layers: Vec<SettingsLayer>,
}

/// Origin for a single settings layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsLayerSource {
    /// System-wide settings.
    System,
    /// User-specific settings.
    User,
    /// Current working directory settings.
    Cwd,
    /// Runtime overrides (highest precedence).
    Runtime,
}

/// Metadata about a loaded settings layer.
#[derive(Debug, Clone)]
pub struct SettingsLayer {
    /// Layer origin.
    pub source: SettingsLayerSource,
    /// Location on disk.
    pub path: Option<PathBuf>,
}

/// Options controlling layered settings discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredSettingsOptions {
    /// Working directory searched for a local `reo.json5`.
    pub cwd: PathBuf,
    /// Optional system settings path (defaults to `/etc/reo/reo.json5` on Unix).
    pub system_path: Option<PathBuf>,
    /// Optional user settings path (defaults to `~/.reo/reo.json5`).
    pub user_path: Option<PathBuf>,
    /// Runtime override paths applied last, in order.
    pub runtime_paths: Vec<PathBuf>,
}

impl LayeredSettingsOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_path: layer_io::default_system_path(),
            user_path: layer_io::default_user_path(),
            runtime_paths: Vec::new(),
        }
    }

    /// Add a runtime override path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl ValidatorSettings {
    /// Load settings from a single path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading settings from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        let value: Value = json5::from_str(&contents)?;
        settings_from_value(value, "settings")
    }

    /// Load settings from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading settings from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        settings_from_value(value, "settings")
    }

    /// Load a layered settings stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredSettings, ConfigError> {
        info!(
            "loading layered settings with defaults (cwd={})",
            cwd.as_ref().display()
        );
        Self::load_layered_with_options(LayeredSettingsOptions::new(cwd))
    }

    /// Load a layered settings stack using explicit locations.
    ///
    /// Layer precedence (low -> high): system, user, cwd, runtime overrides.
    pub fn load_layered_with_options(
        options: LayeredSettingsOptions,
    ) -> Result<LayeredSettings, ConfigError> {
        let cwd = layer_io::resolve_cwd(&options.cwd)?;
        debug!("normalized cwd for settings load: {}", cwd.display());
        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());
        let mut seen_paths = HashSet::new();

        let cwd_path = cwd.join(DEFAULT_SETTINGS_FILE);
        let optional = [
            (SettingsLayerSource::System, options.system_path.as_deref()),
            (SettingsLayerSource::User, options.user_path.as_deref()),
            (SettingsLayerSource::Cwd, Some(cwd_path.as_path())),
        ];
        for (source, path) in optional {
            let Some(path) = path else {
                continue;
            };
            if !seen_paths.insert(layer_io::canonical_or_raw(path)) {
                debug!(
                    "skipping duplicate layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            if let Some(layer) = layer_io::load_optional_layer(source, path)? {
                debug!("loaded {:?} layer", source);
                merge::merge_json_values(&mut merged, &layer.value);
                layers.push(layer.meta);
            }
        }

        for runtime_path in &options.runtime_paths {
            let layer = layer_io::load_required_layer(SettingsLayerSource::Runtime, runtime_path)?;
            debug!("loaded runtime layer (path={})", runtime_path.display());
            merge::merge_json_values(&mut merged, &layer.value);
            layers.push(layer.meta);
        }

        let settings = settings_from_value(merged, "effective")?;
        info!("layered settings loaded (layers={})", layers.len());
        Ok(LayeredSettings { settings, layers })
    }

    /// Validate invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.urdb.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "urdb.base_url cannot be empty".to_string(),
            ));
        }
        if self.urdb.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "urdb.timeout_secs must be positive".to_string(),
            ));
        }
        for (name, bounds) in [
            ("siting.latitude", self.siting.latitude),
            ("siting.longitude", self.siting.longitude),
        ] {
            let Some([min, max]) = bounds else {
                continue;
            };
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "{name} lower bound {min} exceeds upper bound {max}"
                )));
            }
        }
        Ok(())
    }
}

/// Internal representation of a loaded settings layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: SettingsLayer,
    value: Value,
}

fn settings_from_value(value: Value, label: &str) -> Result<ValidatorSettings, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let settings: ValidatorSettings = serde_json::from_value(value)?;
    settings.validate()?;
    Ok(settings)
}
