//! IO helpers for reading settings layers from disk.

use super::{
    DEFAULT_SETTINGS_DIR, DEFAULT_SETTINGS_FILE, LoadedLayer, SettingsLayer, SettingsLayerSource,
    schema,
};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Load a layer if the provided path exists.
pub(super) fn load_optional_layer(
    source: SettingsLayerSource,
    path: &Path,
) -> Result<Option<LoadedLayer>, ConfigError> {
    if !path.exists() {
        debug!(
            "optional layer missing (source={:?}, path={})",
            source,
            path.display()
        );
        return Ok(None);
    }
    Ok(Some(load_required_layer(source, path)?))
}

/// Load and schema-check a required layer from disk.
pub(super) fn load_required_layer(
    source: SettingsLayerSource,
    path: &Path,
) -> Result<LoadedLayer, ConfigError> {
    debug!(
        "loading settings layer (source={:?}, path={})",
        source,
        path.display()
    );
    let contents = fs::read_to_string(path)?;
    let value: Value = json5::from_str(&contents)?;
    schema::validate_layer_schema(&value, &layer_label(source, path))?;
    Ok(LoadedLayer {
        meta: SettingsLayer {
            source,
            path: Some(path.to_path_buf()),
        },
        value,
    })
}

/// Build a user-friendly label for schema errors.
pub(super) fn layer_label(source: SettingsLayerSource, path: &Path) -> String {
    let name = match source {
        SettingsLayerSource::System => "system",
        SettingsLayerSource::User => "user",
        SettingsLayerSource::Cwd => "cwd",
        SettingsLayerSource::Runtime => "runtime",
    };
    format!("{name}({})", path.display())
}

/// Default system settings path on Unix; None elsewhere.
pub(super) fn default_system_path() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        Some(PathBuf::from(super::SYSTEM_SETTINGS_PATH))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// Default user settings path under the home directory.
pub(super) fn default_user_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_SETTINGS_DIR)
            .join(DEFAULT_SETTINGS_FILE)
    })
}

/// Resolve the working directory; one that does not exist is kept as given.
pub(super) fn resolve_cwd(cwd: &Path) -> Result<PathBuf, ConfigError> {
    match fs::canonicalize(cwd) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
        resolved => Ok(resolved.unwrap_or_else(|_| cwd.to_path_buf())),
    }
}

/// Canonical form of `path` used to skip layers seen twice.
pub(super) fn canonical_or_raw(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
