//! Entry point tying the catalog, services and passes together.

use crate::passes;
use crate::report::{ReportMessages, ValidationReport};
use crate::services::{
    BoundedSiting, FuelBurnModel, LoadProfileSource, Services, SitingGeometry,
};
use crate::tree::ConfigTree;
use crate::walker::{PassContext, TreeWalker};
use log::{debug, info};
use reo_config::ValidatorSettings;
use reo_schema::{ObjectPath, SchemaCatalog};
use reo_urdb::{RateLookup, RateStructureValidator};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Path recorded for rejected top-level keys.
pub const TOP_LEVEL_LABEL: &str = "Top Level";

/// Normalized document and findings of one validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub document: Value,
    pub report: ValidationReport,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }

    pub fn messages(&self) -> ReportMessages {
        self.report.messages()
    }

    /// Serializable summary: validity, messages and the normalized input.
    pub fn summary(&self) -> ValidationSummary<'_> {
        ValidationSummary {
            is_valid: self.is_valid(),
            messages: self.messages(),
            input: &self.document,
        }
    }
}

/// Output shape of the command-line tool.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary<'a> {
    pub is_valid: bool,
    pub messages: ReportMessages,
    pub input: &'a Value,
}

/// Validates documents against one schema catalog.
///
/// A validator holds no per-run state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct Validator {
    catalog: Arc<SchemaCatalog>,
    services: Services,
}

impl Validator {
    /// Validator with offline default services.
    pub fn new(catalog: impl Into<Arc<SchemaCatalog>>) -> Self {
        Self::builder(catalog).build()
    }

    pub fn builder(catalog: impl Into<Arc<SchemaCatalog>>) -> ValidatorBuilder {
        ValidatorBuilder::new(catalog.into())
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Run every pass over `document`. Findings are reported, never returned
    /// as errors.
    pub fn validate(&self, document: Value) -> ValidationOutcome {
        let mut report = ValidationReport::new();
        let root = self.prepare_root(document, &mut report);
        let mut tree = ConfigTree::new(root);

        let walker = TreeWalker::new(&self.catalog);
        let mut ctx = PassContext {
            tree: &mut tree,
            report: &mut report,
            catalog: &self.catalog,
            services: &self.services,
        };
        for pass in passes::pipeline() {
            walker.run(pass, &mut ctx);
            debug!(
                "pass {} done (errors={})",
                pass.name(),
                ctx.report.errors.len() + ctx.report.urdb_errors.len()
            );
        }

        info!(
            "validation finished (valid={}, errors={}, defaults={}, invalid={}, resampled={}, nulls={})",
            report.is_valid(),
            report.errors.len() + report.urdb_errors.len(),
            report.defaults_inserted.len(),
            report.invalid_inputs.len(),
            report.resampled_inputs.len(),
            report.input_as_none.len()
        );
        ValidationOutcome {
            document: tree.into_value(),
            report,
        }
    }

    /// Keep only the scenario object at the root; other keys are reported.
    fn prepare_root(&self, document: Value, report: &mut ValidationReport) -> Value {
        let scenario_key = self.catalog.scenario_key();
        let top_level = ObjectPath::label(TOP_LEVEL_LABEL);
        let mut scenario = Value::Object(Map::new());

        match document {
            Value::Object(map) => {
                for (key, value) in map {
                    if key != scenario_key {
                        report.invalid_input(key, &top_level);
                        continue;
                    }
                    match value {
                        Value::Object(_) => scenario = value,
                        Value::Null => {}
                        _ => report.invalid_input(key, &top_level),
                    }
                }
            }
            Value::Null => {}
            other => report.invalid_input(other.to_string(), &top_level),
        }

        let mut root = Map::new();
        root.insert(scenario_key.to_string(), scenario);
        Value::Object(root)
    }
}

/// Builder for `Validator`, mirroring the settings-driven defaults.
pub struct ValidatorBuilder {
    catalog: Arc<SchemaCatalog>,
    services: Services,
}

impl ValidatorBuilder {
    fn new(catalog: Arc<SchemaCatalog>) -> Self {
        Self {
            catalog,
            services: Services::default(),
        }
    }

    /// Apply siting bounds and restricted rate labels from `settings`.
    pub fn settings(mut self, settings: &ValidatorSettings) -> Self {
        self.services.siting = Arc::new(BoundedSiting::from_settings(&settings.siting));
        self.services.rate_validator = RateStructureValidator::new()
            .with_restricted_labels(settings.urdb.restricted_labels.iter().cloned());
        self
    }

    pub fn rate_lookup(mut self, rates: Arc<dyn RateLookup>) -> Self {
        self.services.rates = rates;
        self
    }

    pub fn load_profiles(mut self, load_profiles: Arc<dyn LoadProfileSource>) -> Self {
        self.services.load_profiles = load_profiles;
        self
    }

    pub fn siting(mut self, siting: Arc<dyn SitingGeometry>) -> Self {
        self.services.siting = siting;
        self
    }

    pub fn fuel_burn(mut self, fuel_burn: Arc<dyn FuelBurnModel>) -> Self {
        self.services.fuel_burn = fuel_burn;
        self
    }

    pub fn rate_validator(mut self, rate_validator: RateStructureValidator) -> Self {
        self.services.rate_validator = rate_validator;
        self
    }

    pub fn build(self) -> Validator {
        Validator {
            catalog: self.catalog,
            services: self.services,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn validator() -> Validator {
        let catalog = SchemaCatalog::from_value(&json!({
            "Scenario": {"description": {"type": "str"}}
        }))
        .expect("schema");
        Validator::new(catalog)
    }

    #[test]
    fn non_scenario_top_level_keys_are_dropped() {
        let outcome = validator().validate(json!({"Scenario": {}, "Extra": 1}));
        assert!(outcome.is_valid());
        assert_eq!(outcome.document, json!({"Scenario": {}}));
        assert_eq!(outcome.report.invalid_inputs[0].path.to_string(), "Top Level");
        assert_eq!(outcome.report.invalid_inputs[0].detail, "Extra");
    }

    #[test]
    fn missing_scenario_is_created() {
        let outcome = validator().validate(json!({}));
        assert_eq!(outcome.document, json!({"Scenario": {}}));
        assert!(outcome.is_valid());
    }

    #[test]
    fn summary_serializes_validity_messages_and_input() {
        let outcome = validator().validate(json!({"Scenario": {"description": null}}));
        let summary = serde_json::to_value(outcome.summary()).expect("json");
        assert_eq!(
            summary,
            json!({
                "is_valid": true,
                "messages": {"warnings": {
                    "Following inputs were null and removed:": {"Scenario": "description"}
                }},
                "input": {"Scenario": {}}
            })
        );
    }
}
