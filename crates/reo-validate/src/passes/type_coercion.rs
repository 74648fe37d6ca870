//! Conversion of attribute values to their declared types.

use super::render;
use crate::walker::{Pass, PassContext};
use reo_schema::{AttributeType, ConversionError, ObjectPath, ObjectSchema, Primitive};
use serde_json::Value;

/// Converts every attribute to its declared type.
///
/// Failures are recorded and leave the value untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCoercion;

impl Pass for TypeCoercion {
    fn name(&self) -> &'static str {
        "type_coercion"
    }

    fn visit(&self, path: &ObjectPath, schema: &ObjectSchema, ctx: &mut PassContext<'_>) {
        let Some(node) = ctx.tree.object(path) else {
            return;
        };
        let attributes: Vec<(String, Value)> = node
            .iter()
            .filter(|(key, _)| schema.attribute(key).is_some())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        for (name, value) in attributes {
            let Some(spec) = schema.attribute(&name) else {
                continue;
            };
            match spec.kind {
                AttributeType::ScalarOrSeries(scalar) => {
                    coerce_scalar_or_series(path, &name, &value, scalar, ctx)
                }
                AttributeType::Scalar(kind) => match kind.convert(&value) {
                    Ok(converted) => {
                        ctx.tree.set(path, &name, converted);
                    }
                    Err(_) => ctx.report.error(conversion_message(&name, &value, path, kind)),
                },
            }
        }
    }
}

/// A series is converted element-wise and normalized; a scalar becomes a
/// one-element series.
fn coerce_scalar_or_series(
    path: &ObjectPath,
    name: &str,
    value: &Value,
    scalar: Primitive,
    ctx: &mut PassContext<'_>,
) {
    let Value::Array(items) = value else {
        match scalar.convert(value) {
            Ok(converted) => {
                ctx.tree.set(path, name, Value::Array(vec![converted]));
            }
            Err(_) => ctx
                .report
                .error(conversion_message(name, value, path, scalar)),
        }
        return;
    };

    if items.iter().any(Value::is_null) {
        ctx.report
            .error(format!("{name} in {path} contains at least one NaN value."));
        return;
    }
    let converted = items
        .iter()
        .map(|item| scalar.convert(item))
        .collect::<Result<Vec<_>, ConversionError>>();
    match converted {
        Ok(series) => {
            // One element is the wrapped constant form, not a series.
            let constant = series.len() == 1;
            ctx.tree.set(path, name, Value::Array(series));
            if !constant {
                ctx.normalize_series(path, name);
            }
        }
        Err(_) => ctx.report.error(format!(
            "Could not convert {name} ({}) in {path} to list of {}s",
            render(value),
            scalar.name()
        )),
    }
}

fn conversion_message(name: &str, value: &Value, path: &ObjectPath, kind: Primitive) -> String {
    format!(
        "Could not convert {name} ({}) in {path} to {}",
        render(value),
        kind.name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ValidationReport;
    use crate::services::Services;
    use crate::tree::ConfigTree;
    use pretty_assertions::assert_eq;
    use reo_schema::SchemaCatalog;
    use serde_json::json;

    fn run(document: Value) -> (Value, ValidationReport) {
        let catalog = SchemaCatalog::from_value(&json!({
            "Scenario": {
                "time_steps_per_hour": {"type": "int", "default": 1},
                "Site": {
                    "latitude": {"type": "float"},
                    "roof_count": {"type": "int"},
                    "net_metering": {"type": "bool"},
                    "address": {"type": "str"},
                    "loads_kw": {"type": ["float", "list_of_float"]}
                }
            }
        }))
        .expect("schema");
        let mut tree = ConfigTree::new(document);
        let mut report = ValidationReport::new();
        let services = Services::default();
        let mut ctx = PassContext {
            tree: &mut tree,
            report: &mut report,
            catalog: &catalog,
            services: &services,
        };
        let site = ObjectPath::from_names(["Scenario", "Site"]);
        let schema = catalog.scenario().object("Site").expect("site");
        TypeCoercion.visit(&site, schema, &mut ctx);
        (tree.into_value(), report)
    }

    #[test]
    fn converts_scalars_to_declared_types() {
        let (document, report) = run(json!({"Scenario": {"Site": {
            "latitude": "35.5",
            "roof_count": 3.0,
            "net_metering": 1,
            "address": 1200,
            "loads_kw": 4
        }}}));
        assert!(report.is_valid(), "{:?}", report.errors);
        assert_eq!(
            document["Scenario"]["Site"],
            json!({
                "latitude": 35.5,
                "roof_count": 3,
                "net_metering": true,
                "address": "1200",
                "loads_kw": [4.0]
            })
        );
    }

    #[test]
    fn failed_conversion_leaves_value_in_place() {
        let (document, report) = run(json!({"Scenario": {"Site": {
            "latitude": "north",
            "net_metering": "yes"
        }}}));
        assert_eq!(
            report.errors,
            vec![
                "Could not convert latitude (north) in Scenario>Site to float".to_string(),
                "Could not convert net_metering (yes) in Scenario>Site to bool".to_string(),
            ]
        );
        assert_eq!(document["Scenario"]["Site"]["latitude"], json!("north"));
    }

    #[test]
    fn series_with_null_or_text_is_rejected() {
        let (_, report) = run(json!({"Scenario": {"Site": {"loads_kw": [1, null, 3]}}}));
        assert_eq!(
            report.errors,
            vec!["loads_kw in Scenario>Site contains at least one NaN value.".to_string()]
        );

        let (_, report) = run(json!({"Scenario": {"Site": {"loads_kw": [1, "x"]}}}));
        assert_eq!(
            report.errors,
            vec!["Could not convert loads_kw ([1,\"x\"]) in Scenario>Site to list of floats".to_string()]
        );
    }

    #[test]
    fn one_element_series_is_kept_as_a_constant() {
        let (document, report) = run(json!({"Scenario": {"Site": {"loads_kw": [7]}}}));
        assert!(report.is_valid(), "{:?}", report.errors);
        assert_eq!(document["Scenario"]["Site"]["loads_kw"], json!([7.0]));
    }

    #[test]
    fn empty_series_fails_the_length_check() {
        let (_, report) = run(json!({"Scenario": {"Site": {"loads_kw": []}}}));
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Invalid length for loads_kw."));
    }

    #[test]
    fn converted_series_is_normalized() {
        let (document, report) = run(json!({"Scenario": {"Site": {"loads_kw": vec![1; 17520]}}}));
        assert!(report.is_valid());
        assert_eq!(report.resampled_inputs.len(), 1);
        assert_eq!(
            document["Scenario"]["Site"]["loads_kw"]
                .as_array()
                .map(Vec::len),
            Some(8760)
        );
    }
}
