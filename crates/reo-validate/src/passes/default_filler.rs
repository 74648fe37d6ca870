//! Insertion of schema defaults.

use crate::walker::{Pass, PassContext};
use log::debug;
use reo_schema::{AttributeSpec, AttributeType, DefaultValue, ObjectPath, ObjectSchema};
use serde_json::{Map, Value};

/// Inserts declared defaults for attributes and objects the document omits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFiller;

impl Pass for DefaultFiller {
    fn name(&self) -> &'static str {
        "default_filler"
    }

    fn visit(&self, path: &ObjectPath, schema: &ObjectSchema, ctx: &mut PassContext<'_>) {
        ensure_object(path, ctx);

        let missing: Vec<(String, Value)> = schema
            .attributes()
            .filter(|(name, _)| ctx.tree.get(path, name).is_none())
            .filter_map(|(name, spec)| {
                let value = match spec.default.as_ref()? {
                    DefaultValue::Literal(value) => value.clone(),
                    DefaultValue::Reference(names) => {
                        let mut full = ctx.scenario_path().names().to_vec();
                        full.extend(names.iter().cloned());
                        let resolved = ctx.tree.resolve(&full).filter(|value| !value.is_null());
                        let Some(resolved) = resolved else {
                            debug!("default for {name} in {path} references missing {names:?}");
                            return None;
                        };
                        resolved.clone()
                    }
                };
                Some((name.clone(), spec.wrap_default(typed_default(spec, value))))
            })
            .collect();

        for (name, value) in missing {
            if ctx.tree.set(path, &name, value) {
                ctx.report.default_inserted(name, path);
            }
        }
    }
}

/// Convert a default to the declared type so a later run sees it unchanged.
/// Defaults that do not convert are inserted as declared.
fn typed_default(spec: &AttributeSpec, value: Value) -> Value {
    let converted = match (spec.kind, &value) {
        (AttributeType::ScalarOrSeries(scalar), Value::Array(items)) => items
            .iter()
            .map(|item| scalar.convert(item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (kind, _) => kind.scalar().convert(&value),
    };
    converted.unwrap_or(value)
}

/// Make sure an object exists at `path` so its own defaults can be filled.
///
/// A missing or null object is inserted as `{}` and counted as a default; any
/// other non-object value is replaced and reported as invalid.
fn ensure_object(path: &ObjectPath, ctx: &mut PassContext<'_>) {
    let (Some(parent), Some(name)) = (path.parent(), path.tail()) else {
        return;
    };
    let current = ctx.tree.get(&parent, name);
    let replaced_invalid = match current {
        Some(Value::Object(_)) => return,
        None | Some(Value::Null) => false,
        Some(_) => true,
    };
    if !ctx.tree.set(&parent, name, Value::Object(Map::new())) {
        return;
    }
    if replaced_invalid {
        ctx.report.invalid_input(name, &parent);
    } else {
        ctx.report.default_inserted(name, &parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ValidationReport;
    use crate::services::Services;
    use crate::tree::ConfigTree;
    use crate::walker::TreeWalker;
    use pretty_assertions::assert_eq;
    use reo_schema::SchemaCatalog;
    use serde_json::json;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::from_value(&json!({
            "Scenario": {
                "Site": {
                    "latitude": {"type": "float"},
                    "land_acres": {"type": "float", "default": 0},
                    "PV": {
                        "tilt": {"type": "float", "default": "Site latitude"},
                        "prod_factor": {"type": ["float", "list_of_float"], "default": 1.0}
                    }
                }
            }
        }))
        .expect("schema")
    }

    fn run(document: Value) -> (Value, ValidationReport) {
        let catalog = catalog();
        let mut tree = ConfigTree::new(document);
        let mut report = ValidationReport::new();
        let services = Services::default();
        let mut ctx = PassContext {
            tree: &mut tree,
            report: &mut report,
            catalog: &catalog,
            services: &services,
        };
        TreeWalker::new(&catalog).run(&DefaultFiller, &mut ctx);
        (tree.into_value(), report)
    }

    #[test]
    fn fills_literals_references_and_missing_objects() {
        let (document, report) = run(json!({"Scenario": {"Site": {"latitude": 40.5}}}));
        assert_eq!(
            document,
            json!({"Scenario": {"Site": {
                "latitude": 40.5,
                "land_acres": 0.0,
                "PV": {"tilt": 40.5, "prod_factor": [1.0]}
            }}})
        );
        let inserted: Vec<_> = report
            .defaults_inserted
            .iter()
            .map(|w| format!("{}:{}", w.path, w.detail))
            .collect();
        assert_eq!(
            inserted,
            vec![
                "Scenario>Site:land_acres",
                "Scenario>Site:PV",
                "Scenario>Site>PV:prod_factor",
                "Scenario>Site>PV:tilt",
            ]
        );
    }

    #[test]
    fn unresolvable_reference_inserts_nothing() {
        let (document, _) = run(json!({"Scenario": {"Site": {}}}));
        assert_eq!(document["Scenario"]["Site"]["PV"].get("tilt"), None);
    }

    #[test]
    fn scalar_in_object_slot_is_replaced_and_reported() {
        let (document, report) = run(json!({"Scenario": {"Site": 7}}));
        assert_eq!(document["Scenario"]["Site"]["land_acres"], json!(0.0));
        assert_eq!(report.invalid_inputs.len(), 1);
        assert_eq!(report.invalid_inputs[0].detail, "Site");
    }

    #[test]
    fn present_values_are_kept() {
        let (document, report) = run(json!({"Scenario": {"Site": {
            "latitude": 1.0, "land_acres": 5.0, "PV": {"tilt": 20.0, "prod_factor": [0.5]}
        }}}));
        assert_eq!(document["Scenario"]["Site"]["PV"]["tilt"], json!(20.0));
        assert!(report.defaults_inserted.is_empty());
    }
}
