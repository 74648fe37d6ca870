//! Schema-guided traversal that drives the validation passes.

use crate::report::ValidationReport;
use crate::services::Services;
use crate::timeseries::TimeSeriesNormalizer;
use crate::tree::ConfigTree;
use log::debug;
use reo_schema::{ObjectPath, ObjectSchema, SchemaCatalog};
use serde_json::Value;

/// State shared by every pass of one validation run.
pub struct PassContext<'a> {
    pub tree: &'a mut ConfigTree,
    pub report: &'a mut ValidationReport,
    pub catalog: &'a SchemaCatalog,
    pub services: &'a Services,
}

impl PassContext<'_> {
    /// Path of the top-level scenario object.
    pub fn scenario_path(&self) -> ObjectPath {
        ObjectPath::label(self.catalog.scenario_key())
    }

    /// Resolution of the scenario: the document value, else the schema
    /// default, else hourly.
    pub fn steps_per_hour(&self) -> usize {
        let declared = self
            .tree
            .get(&self.scenario_path(), "time_steps_per_hour")
            .cloned()
            .or_else(|| {
                self.catalog
                    .scenario()
                    .attribute("time_steps_per_hour")
                    .and_then(|spec| spec.literal_default())
            });
        declared
            .as_ref()
            .and_then(|value| {
                value
                    .as_u64()
                    .or_else(|| value.as_f64().filter(|raw| *raw >= 1.0).map(|raw| raw as u64))
            })
            .map(|steps| steps.max(1) as usize)
            .unwrap_or(1)
    }

    pub fn normalizer(&self) -> TimeSeriesNormalizer {
        TimeSeriesNormalizer::new(self.steps_per_hour())
    }

    /// Length-check and resample the numeric series `name` at `path`.
    ///
    /// Every length other than a full year at a supported resolution is an
    /// error, including empty series. Values that are not all-numeric arrays
    /// are left alone.
    pub fn normalize_series(&mut self, path: &ObjectPath, name: &str) {
        let Some(Value::Array(items)) = self.tree.get(path, name) else {
            return;
        };
        let Some(values) = items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>() else {
            return;
        };

        match self.normalizer().normalize(name, &values) {
            Ok(None) => {}
            Ok(Some(resampled)) => {
                debug!(
                    "resampled {name} in {path} ({} -> {} samples)",
                    values.len(),
                    resampled.values.len()
                );
                let series = resampled.values.into_iter().map(Value::from).collect();
                self.tree.set(path, name, Value::Array(series));
                self.report.resampled(resampled.message, path);
            }
            Err(err) => self.report.error(err.to_string()),
        }
    }
}

/// One complete traversal applied to every object in the schema.
pub trait Pass {
    fn name(&self) -> &'static str;

    /// Visit the object at `path`; `schema` is its definition. The object may
    /// be absent from the document.
    fn visit(&self, path: &ObjectPath, schema: &ObjectSchema, ctx: &mut PassContext<'_>);
}

/// Recursive descent over the single-object keys of a schema.
#[derive(Debug, Clone, Copy)]
pub struct TreeWalker<'a> {
    catalog: &'a SchemaCatalog,
}

impl<'a> TreeWalker<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self { catalog }
    }

    /// Apply `pass` to every object the schema declares, parents first.
    ///
    /// Collections are never descended into.
    pub fn run(&self, pass: &dyn Pass, ctx: &mut PassContext<'_>) {
        debug!("running pass {}", pass.name());
        self.descend(pass, &ObjectPath::root(), self.catalog.root(), ctx);
    }

    fn descend(
        &self,
        pass: &dyn Pass,
        path: &ObjectPath,
        schema: &ObjectSchema,
        ctx: &mut PassContext<'_>,
    ) {
        for (name, child) in schema.objects() {
            let child_path = path.child(name);
            pass.visit(&child_path, child, ctx);
            self.descend(pass, &child_path, child, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;

    struct Recorder {
        visited: RefCell<Vec<(String, bool)>>,
    }

    impl Pass for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn visit(&self, path: &ObjectPath, _schema: &ObjectSchema, ctx: &mut PassContext<'_>) {
            let present = ctx.tree.object(path).is_some();
            self.visited.borrow_mut().push((path.to_string(), present));
        }
    }

    #[test]
    fn visits_objects_parents_first_and_skips_collections() {
        let catalog = SchemaCatalog::from_value(&json!({
            "Scenario": {
                "Site": {
                    "PV": {"tilt": {"type": "float"}},
                    "Storage": {"max_kw": {"type": "float"}}
                },
                "Profiles": {"name": {"type": "str"}}
            }
        }))
        .expect("schema");
        let mut tree = ConfigTree::new(json!({"Scenario": {"Site": {"PV": {}}}}));
        let mut report = ValidationReport::new();
        let services = Services::default();
        let mut ctx = PassContext {
            tree: &mut tree,
            report: &mut report,
            catalog: &catalog,
            services: &services,
        };

        let recorder = Recorder {
            visited: RefCell::new(Vec::new()),
        };
        TreeWalker::new(&catalog).run(&recorder, &mut ctx);
        assert_eq!(
            recorder.visited.into_inner(),
            vec![
                ("Scenario".to_string(), true),
                ("Scenario>Site".to_string(), true),
                ("Scenario>Site>PV".to_string(), true),
                ("Scenario>Site>Storage".to_string(), false),
            ]
        );
    }

    #[test]
    fn steps_per_hour_prefers_document_then_schema_default() {
        let catalog = SchemaCatalog::from_value(&json!({
            "Scenario": {"time_steps_per_hour": {"type": "int", "default": 2}}
        }))
        .expect("schema");
        let services = Services::default();
        let mut report = ValidationReport::new();

        let mut tree = ConfigTree::new(json!({"Scenario": {}}));
        let ctx = PassContext {
            tree: &mut tree,
            report: &mut report,
            catalog: &catalog,
            services: &services,
        };
        assert_eq!(ctx.steps_per_hour(), 2);

        let mut tree = ConfigTree::new(json!({"Scenario": {"time_steps_per_hour": 4}}));
        let ctx = PassContext {
            tree: &mut tree,
            report: &mut report,
            catalog: &catalog,
            services: &services,
        };
        assert_eq!(ctx.steps_per_hour(), 4);
    }
}
