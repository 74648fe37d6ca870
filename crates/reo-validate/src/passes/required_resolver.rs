//! Required inputs and replacement sets.

use super::is_present;
use crate::walker::{Pass, PassContext};
use reo_schema::{AttributeSpec, ObjectPath, ObjectSchema};
use serde_json::{Map, Value};

/// Reports required attributes that are missing, honouring `depends_on` and
/// `replacement_sets` alternatives. At most one message per object.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredResolver;

impl Pass for RequiredResolver {
    fn name(&self) -> &'static str {
        "required_resolver"
    }

    fn visit(&self, path: &ObjectPath, schema: &ObjectSchema, ctx: &mut PassContext<'_>) {
        let empty = Map::new();
        let node = ctx.tree.object(path).unwrap_or(&empty);
        if let Some(message) = missing_message(schema, node) {
            ctx.report
                .error(format!("Missing Required for {path}: {message}"));
        }
    }
}

/// Compose the missing-input message for one object, if anything is missing.
fn missing_message(schema: &ObjectSchema, node: &Map<String, Value>) -> Option<String> {
    let mut alternatives: Vec<String> = Vec::new();
    for (name, spec) in schema.attributes() {
        let branches = missing_branches(name, spec, node);
        if branches.is_empty() {
            continue;
        }
        let message = branches
            .iter()
            .map(|branch| format!("({})", branch.join(" and ")))
            .collect::<Vec<_>>()
            .join(" OR ");
        if !alternatives.contains(&message) {
            alternatives.push(message);
        }
    }

    let simple: Vec<&str> = schema
        .attributes()
        .filter(|(name, spec)| spec.required && !is_present(node, name))
        .map(|(name, _)| name.as_str())
        .collect();

    let mut message = alternatives.join(" AND ");
    if !simple.is_empty() {
        if !message.is_empty() {
            message.push_str(" and ");
        }
        message.push_str(&simple.join(" and "));
    }
    (!message.is_empty()).then_some(message)
}

/// Unsatisfied name groups for one attribute, sorted and de-duplicated.
///
/// With replacement sets, the attribute plus its dependencies or any one
/// fully present set satisfies it. Without them, a present attribute needs
/// every `depends_on` name.
fn missing_branches(
    name: &str,
    spec: &AttributeSpec,
    node: &Map<String, Value>,
) -> Vec<Vec<String>> {
    let mut branches: Vec<Vec<String>> = Vec::new();
    match &spec.replacement_sets {
        Some(sets) => {
            let satisfied = std::iter::once(name)
                .chain(spec.depends_on.iter().map(String::as_str))
                .all(|key| is_present(node, key));
            if satisfied {
                return branches;
            }
            for set in sets {
                if set.iter().all(|key| is_present(node, key)) {
                    return Vec::new();
                }
                let mut sorted = set.clone();
                sorted.sort();
                if !branches.contains(&sorted) {
                    branches.push(sorted);
                }
            }
        }
        None => {
            if is_present(node, name) {
                let missing: Vec<String> = spec
                    .depends_on
                    .iter()
                    .filter(|key| !is_present(node, key))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    branches.push(missing);
                }
            }
        }
    }
    branches.sort();
    branches
}
