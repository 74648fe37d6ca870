//! Public surface for reo.
//!
//! Re-exports the schema, settings, rate and validation crates and wires them
//! together the way the `reo-validate` binary does.

use anyhow::Context;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

/// Re-export for convenience.
pub use reo_config as config;
/// Re-export for convenience.
pub use reo_schema as schema;
/// Re-export for convenience.
pub use reo_urdb as urdb;
/// Re-export for convenience.
pub use reo_validate as validate;

pub use reo_config::ValidatorSettings;
pub use reo_schema::SchemaCatalog;
pub use reo_validate::{ValidationOutcome, ValidationReport, Validator};

/// Initialize logging using env_logger.
///
/// Safe to call more than once; later calls are ignored.
#[inline]
pub fn init_logging() {
    let _ = env_logger::try_init();
}

/// Where rate documents come from when a tariff names a label or utility.
#[derive(Debug, Clone, Default)]
pub enum RateSource {
    /// No lookups; only inline rate documents are checked.
    #[default]
    Offline,
    /// Rate documents loaded from a JSON5 file.
    File(std::path::PathBuf),
    /// The OpenEI service configured in the settings.
    Service,
}

/// Build a validator for the schema at `schema` with collaborators taken
/// from `settings` and `rates`.
pub fn build_validator(
    settings: &ValidatorSettings,
    schema: &Path,
    rates: &RateSource,
) -> anyhow::Result<Validator> {
    let catalog = SchemaCatalog::load_from_path(schema)
        .with_context(|| format!("failed to load schema {}", schema.display()))?;

    let mut builder = Validator::builder(catalog).settings(settings);
    match rates {
        RateSource::Offline => debug!("rate lookups disabled"),
        RateSource::File(path) => {
            info!("loading rate documents from {}", path.display());
            let lookup = reo_urdb::StaticRateLookup::load_from_path(path)
                .context("failed to load rate documents")?;
            builder = builder.rate_lookup(Arc::new(lookup));
        }
        RateSource::Service => {
            let client = reo_urdb::UrdbClient::from_settings(&settings.urdb)
                .context("failed to build URDB client")?;
            debug!("rate lookups via {client:?}");
            builder = builder.rate_lookup(Arc::new(client));
        }
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn init_logging_is_repeatable() {
        init_logging();
        init_logging();
    }

    #[test]
    fn missing_schema_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = ValidatorSettings::default();
        let err = build_validator(
            &settings,
            &dir.path().join("absent.json5"),
            &RateSource::Offline,
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to load schema"));
    }

    #[test]
    fn builds_from_schema_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let schema = dir.path().join("schema.json5");
        fs::write(&schema, "{Scenario: {description: {type: 'str'}}}").expect("write");
        let settings = ValidatorSettings::builder().build();

        let validator =
            build_validator(&settings, &schema, &RateSource::Offline).expect("validator");
        assert_eq!(validator.catalog().scenario_key(), "Scenario");
    }
}
