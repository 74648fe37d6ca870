//! Settings model for the validator and its collaborators.

use serde::{Deserialize, Serialize};

/// Root settings for a validator instance.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidatorSettings {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub urdb: UrdbSettings,
    #[serde(default)]
    pub siting: SitingSettings,
}

impl ValidatorSettings {
    /// Start building settings programmatically with defaults applied.
    pub fn builder() -> ValidatorSettingsBuilder {
        ValidatorSettingsBuilder::new()
    }
}

/// Builder for assembling `ValidatorSettings` in code.
#[derive(Debug, Default, Clone)]
pub struct ValidatorSettingsBuilder {
    settings: ValidatorSettings,
}

impl ValidatorSettingsBuilder {
    /// Create a new builder seeded with default settings.
    pub fn new() -> Self {
        Self {
            settings: ValidatorSettings::default(),
        }
    }

    /// Replace the rate database settings.
    pub fn urdb(mut self, urdb: UrdbSettings) -> Self {
        self.settings.urdb = urdb;
        self
    }

    /// Replace the siting bounds.
    pub fn siting(mut self, siting: SitingSettings) -> Self {
        self.settings.siting = siting;
        self
    }

    /// Finalize and return the built settings.
    pub fn build(self) -> ValidatorSettings {
        self.settings
    }
}

/// Utility rate database (URDB) lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrdbSettings {
    /// Base URL of the utility rates endpoint.
    #[serde(default = "default_urdb_base_url")]
    pub base_url: String,
    /// API key sent with every lookup.
    #[serde(default)]
    pub api_key: Option<String>,
    /// API version requested.
    #[serde(default = "default_urdb_api_version")]
    pub api_version: u32,
    /// Request timeout in seconds.
    #[serde(default = "default_urdb_timeout_secs")]
    pub timeout_secs: u64,
    /// Rate labels rejected because they are known to be too hard to solve.
    #[serde(default)]
    pub restricted_labels: Vec<String>,
}

impl Default for UrdbSettings {
    fn default() -> Self {
        Self {
            base_url: default_urdb_base_url(),
            api_key: None,
            api_version: default_urdb_api_version(),
            timeout_secs: default_urdb_timeout_secs(),
            restricted_labels: Vec::new(),
        }
    }
}

fn default_urdb_base_url() -> String {
    "https://api.openei.org/utility_rates".to_string()
}

fn default_urdb_api_version() -> u32 {
    7
}

fn default_urdb_timeout_secs() -> u64 {
    30
}

/// Geographic bounds of the wind resource dataset used for turbine siting.
///
/// Unset bounds accept every coordinate.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SitingSettings {
    /// Inclusive `[min, max]` latitude range.
    #[serde(default)]
    pub latitude: Option<[f64; 2]>,
    /// Inclusive `[min, max]` longitude range.
    #[serde(default)]
    pub longitude: Option<[f64; 2]>,
}
