//! Collaborators consulted by the object-specific rules.

use reo_config::{SitingSettings, ValidatorSettings};
use reo_urdb::{RateLookup, RateStructureValidator, StaticRateLookup};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a collaborator; rendered as one input error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    OutOfBounds(String),
}

/// Inputs for building a simulated load profile.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProfileRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Building parameters from the `LoadProfile` object.
    pub parameters: Map<String, Value>,
}

/// Source of built-in (simulated) hourly load profiles.
pub trait LoadProfileSource: Send + Sync {
    fn built_in_profile(&self, request: &LoadProfileRequest) -> Result<Vec<f64>, ServiceError>;
}

/// Checks that a location can be sited against the wind resource data.
pub trait SitingGeometry: Send + Sync {
    fn check_site(&self, latitude: f64, longitude: f64) -> Result<(), ServiceError>;
}

/// Default generator fuel curve as a function of size.
pub trait FuelBurnModel: Send + Sync {
    /// Returns `(slope gal/kWh, intercept gal/hr)` for a generator of `size_kw`.
    fn default_fuel_burn_rate(&self, size_kw: f64) -> (f64, f64);
}

/// Load-profile source used when no profile library is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBuiltInProfiles;

impl LoadProfileSource for NoBuiltInProfiles {
    fn built_in_profile(&self, _request: &LoadProfileRequest) -> Result<Vec<f64>, ServiceError> {
        Err(ServiceError::Unavailable(
            "Built-in load profiles are not available. Provide LoadProfile annual_kwh or loads_kw."
                .to_string(),
        ))
    }
}

/// Siting check against a latitude/longitude bounding box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundedSiting {
    latitude: Option<[f64; 2]>,
    longitude: Option<[f64; 2]>,
}

impl BoundedSiting {
    pub fn from_settings(settings: &SitingSettings) -> Self {
        Self {
            latitude: settings.latitude,
            longitude: settings.longitude,
        }
    }
}

impl SitingGeometry for BoundedSiting {
    fn check_site(&self, latitude: f64, longitude: f64) -> Result<(), ServiceError> {
        for (label, value, bounds) in [
            ("Latitude", latitude, self.latitude),
            ("Longitude", longitude, self.longitude),
        ] {
            let Some([min, max]) = bounds else {
                continue;
            };
            if value < min || value > max {
                return Err(ServiceError::OutOfBounds(format!(
                    "{label} ({value}) outside the wind resource dataset bounds of {min} to {max}"
                )));
            }
        }
        Ok(())
    }
}

/// Stand-in diesel fuel curves by size band.
///
/// The bands are approximate. Callers with a site-specific curve should
/// supply their own `FuelBurnModel`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DieselFuelBurn;

/// `(upper size kW, slope gal/kWh, intercept gal/hr per kW)`.
const DIESEL_FUEL_CURVES: &[(f64, f64, f64)] = &[
    (40.0, 0.068, 0.0125),
    (80.0, 0.066, 0.0142),
    (150.0, 0.0644, 0.0095),
    (250.0, 0.0648, 0.0067),
    (750.0, 0.0656, 0.0048),
    (1500.0, 0.0657, 0.0043),
];

/// Curve above the largest tabulated size.
const DIESEL_FUEL_CURVE_LARGE: (f64, f64) = (0.0657, 0.0033);

impl FuelBurnModel for DieselFuelBurn {
    fn default_fuel_burn_rate(&self, size_kw: f64) -> (f64, f64) {
        let (slope, intercept) = DIESEL_FUEL_CURVES
            .iter()
            .find(|(upper, _, _)| size_kw <= *upper)
            .map(|(_, slope, intercept)| (*slope, *intercept))
            .unwrap_or(DIESEL_FUEL_CURVE_LARGE);
        (slope, intercept * size_kw)
    }
}

/// Everything the rules may call out to.
#[derive(Clone)]
pub struct Services {
    pub rates: Arc<dyn RateLookup>,
    pub load_profiles: Arc<dyn LoadProfileSource>,
    pub siting: Arc<dyn SitingGeometry>,
    pub fuel_burn: Arc<dyn FuelBurnModel>,
    pub rate_validator: RateStructureValidator,
}

impl Services {
    /// Offline services shaped by `settings`: no rate documents, no built-in
    /// profiles, bounding-box siting and the diesel fuel curve.
    pub fn from_settings(settings: &ValidatorSettings) -> Self {
        Self {
            rates: Arc::new(StaticRateLookup::new()),
            load_profiles: Arc::new(NoBuiltInProfiles),
            siting: Arc::new(BoundedSiting::from_settings(&settings.siting)),
            fuel_burn: Arc::new(DieselFuelBurn),
            rate_validator: RateStructureValidator::new()
                .with_restricted_labels(settings.urdb.restricted_labels.iter().cloned()),
        }
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::from_settings(&ValidatorSettings::default())
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("rate_validator", &self.rate_validator)
            .finish_non_exhaustive()
    }
}
