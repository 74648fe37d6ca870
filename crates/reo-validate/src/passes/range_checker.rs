//! Min, max and allowed-value checks.

use super::render;
use crate::walker::{Pass, PassContext};
use reo_schema::{AttributeSpec, AttributeType, ObjectPath, ObjectSchema, Primitive};
use serde_json::{Number, Value};

/// Enforces declared `min`, `max` and `restrict_to` constraints.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeChecker;

impl Pass for RangeChecker {
    fn name(&self) -> &'static str {
        "range_checker"
    }

    fn visit(&self, path: &ObjectPath, schema: &ObjectSchema, ctx: &mut PassContext<'_>) {
        let Some(node) = ctx.tree.object(path) else {
            return;
        };
        let mut errors = Vec::new();
        for (name, value) in node {
            let Some(spec) = schema.attribute(name) else {
                continue;
            };
            match value {
                Value::Array(items) if spec.kind.checks_elements() => {
                    check_elements(name, value, items, spec, path, &mut errors)
                }
                _ => check_scalar(name, value, spec, path, &mut errors),
            }
        }
        for error in errors {
            ctx.report.error(error);
        }
    }
}

/// Any element outside a bound yields one error for that bound.
fn check_elements(
    name: &str,
    value: &Value,
    items: &[Value],
    spec: &AttributeSpec,
    path: &ObjectPath,
    errors: &mut Vec<String>,
) {
    let Some(numbers) = items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>() else {
        if spec.min.is_some() || spec.max.is_some() {
            errors.push(cannot_check(name, value, path));
        }
        return;
    };
    if let Some(min) = &spec.min {
        if numbers.iter().any(|item| *item < bound(min)) {
            errors.push(format!(
                "At least one value in {name} (from {path}) exceeds allowable min of {min}"
            ));
        }
    }
    if let Some(max) = &spec.max {
        if numbers.iter().any(|item| *item > bound(max)) {
            errors.push(format!(
                "At least one value in {name} (from {path}) exceeds the allowable max of {max}"
            ));
        }
    }
}

/// Scalars are converted again before comparing, so a value that failed
/// coercion is reported here as uncheckable.
fn check_scalar(
    name: &str,
    value: &Value,
    spec: &AttributeSpec,
    path: &ObjectPath,
    errors: &mut Vec<String>,
) {
    let target = match spec.kind {
        AttributeType::ScalarOrSeries(_) => Primitive::Float,
        AttributeType::Scalar(kind) => kind,
    };
    let checked = match target.convert(value) {
        Ok(converted) => {
            if let Some(number) = converted.as_f64() {
                if let Some(min) = &spec.min {
                    if number < bound(min) {
                        errors.push(format!(
                            "{name} value ({}) in {path} exceeds allowable min {min}",
                            render(&converted)
                        ));
                    }
                }
                if let Some(max) = &spec.max {
                    if number > bound(max) {
                        errors.push(format!(
                            "{name} value ({}) in {path} exceeds allowable max {max}",
                            render(&converted)
                        ));
                    }
                }
            }
            converted
        }
        Err(_) => {
            errors.push(cannot_check(name, value, path));
            value.clone()
        }
    };

    if let Some(allowed) = &spec.restrict_to {
        if !allowed.iter().any(|option| same_value(option, &checked)) {
            errors.push(format!(
                "{name} value ({}) in {path} not in allowable inputs - {}",
                render(&checked),
                Value::Array(allowed.clone())
            ));
        }
    }
}

fn cannot_check(name: &str, value: &Value, path: &ObjectPath) -> String {
    format!("Could not check min/max on {name} ({}) in {path}", render(value))
}

fn bound(number: &Number) -> f64 {
    number.as_f64().unwrap_or(f64::NAN)
}

/// Equality that treats `1` and `1.0` as the same value.
fn same_value(left: &Value, right: &Value) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(left), Some(right)) => left == right,
        _ => left == right,
    }
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

    fn check(site: Value) -> Vec<String> {
        let catalog = SchemaCatalog::from_value(&json!({
            "Scenario": {"Site": {
                "latitude": {"type": "float", "min": -90, "max": 90},
                "roof_count": {"type": "int", "min": 0},
                "prices": {"type": ["float", "list_of_float"], "min": 0, "max": 1},
                "building_type": {"type": "str", "restrict_to": ["office", "hospital"]},
                "phases": {"type": "int", "restrict_to": [1, 3]}
            }}
        }))
        .expect("schema");
        let mut tree = ConfigTree::new(json!({"Scenario": {"Site": site}}));
        let mut report = ValidationReport::new();
        let services = Services::default();
        let mut ctx = PassContext {
            tree: &mut tree,
            report: &mut report,
            catalog: &catalog,
            services: &services,
        };
        let path = ObjectPath::from_names(["Scenario", "Site"]);
        let schema = catalog.scenario().object("Site").expect("site");
        RangeChecker.visit(&path, schema, &mut ctx);
        report.errors
    }

    #[test]
    fn values_at_bounds_pass() {
        let errors = check(json!({
            "latitude": 90.0, "roof_count": 0, "prices": [0.0, 1.0],
            "building_type": "office", "phases": 3
        }));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn each_exceeded_bound_is_one_error() {
        assert_eq!(
            check(json!({"latitude": 90.5, "roof_count": -1})),
            vec![
                "latitude value (90.5) in Scenario>Site exceeds allowable max 90".to_string(),
                "roof_count value (-1) in Scenario>Site exceeds allowable min 0".to_string(),
            ]
        );
    }

    #[test]
    fn series_report_each_bound_once() {
        assert_eq!(
            check(json!({"prices": [-1.0, 0.5, 2.0, 3.0]})),
            vec![
                "At least one value in prices (from Scenario>Site) exceeds allowable min of 0"
                    .to_string(),
                "At least one value in prices (from Scenario>Site) exceeds the allowable max of 1"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn unconvertible_values_cannot_be_checked() {
        assert_eq!(
            check(json!({"latitude": "north"})),
            vec!["Could not check min/max on latitude (north) in Scenario>Site".to_string()]
        );
    }

    #[test]
    fn restricted_values_name_the_allowed_set() {
        assert_eq!(
            check(json!({"building_type": "barn", "phases": 1.0})),
            vec![
                "building_type value (barn) in Scenario>Site not in allowable inputs - [\"office\",\"hospital\"]"
                    .to_string()
            ]
        );
    }
}
