//! Schema catalog: nested object definitions and attribute specifications.

use crate::{AttributeType, KeyKind, Primitive, SchemaError};
use log::{debug, info};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Keys an attribute specification may carry.
const ATTRIBUTE_KEYS: &[&str] = &[
    "type",
    "min",
    "max",
    "restrict_to",
    "required",
    "default",
    "depends_on",
    "replacement_sets",
    "description",
];

/// Immutable schema for a whole input document.
///
/// The root holds exactly one object definition, the scenario, which is the
/// only recognized top-level key of an input document.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    root: ObjectSchema,
    scenario: String,
}

/// Definition of one object: its attributes and nested objects.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    attributes: BTreeMap<String, AttributeSpec>,
    objects: BTreeMap<String, ObjectSchema>,
    collections: BTreeMap<String, ObjectSchema>,
}

/// Specification of a single attribute.
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    pub kind: AttributeType,
    pub min: Option<Number>,
    pub max: Option<Number>,
    pub restrict_to: Option<Vec<Value>>,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub depends_on: Vec<String>,
    pub replacement_sets: Option<Vec<Vec<String>>>,
    pub description: Option<String>,
}

/// Default declared for an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Value inserted as-is.
    Literal(Value),
    /// Names walked from the scenario object, e.g. `["Site", "latitude"]`.
    Reference(Vec<String>),
}

impl SchemaCatalog {
    /// Load a schema catalog from a JSON or JSON5 file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        info!("loading schema from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a schema catalog from JSON or JSON5 contents.
    pub fn load_from_str(contents: &str) -> Result<Self, SchemaError> {
        debug!("loading schema from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        Self::from_value(&value)
    }

    /// Build a catalog from an already-parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let map = expect_object(value, "")?;
        let mut scenario = None;
        for key in map.keys() {
            if KeyKind::classify(key) != KeyKind::Object {
                return Err(invalid_entry(key, "top-level keys must be object definitions"));
            }
            if scenario.replace(key.clone()).is_some() {
                return Err(SchemaError::Invalid(
                    "schema must define exactly one top-level object".to_string(),
                ));
            }
        }
        let scenario = scenario.ok_or_else(|| {
            SchemaError::Invalid("schema must define exactly one top-level object".to_string())
        })?;
        let root = parse_object(map, "")?;
        info!(
            "schema catalog ready (scenario={}, objects={})",
            scenario,
            root.count_objects()
        );
        Ok(Self { root, scenario })
    }

    /// Schema for the document root.
    pub fn root(&self) -> &ObjectSchema {
        &self.root
    }

    /// Name of the single top-level object.
    pub fn scenario_key(&self) -> &str {
        &self.scenario
    }

    /// Schema of the top-level object.
    pub fn scenario(&self) -> &ObjectSchema {
        self.root
            .object(&self.scenario)
            .unwrap_or(&self.root)
    }
}

impl ObjectSchema {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&String, &AttributeSpec)> {
        self.attributes.iter()
    }

    pub fn object(&self, name: &str) -> Option<&ObjectSchema> {
        self.objects.get(name)
    }

    /// Nested single objects, the only children the walker descends into.
    pub fn objects(&self) -> impl Iterator<Item = (&String, &ObjectSchema)> {
        self.objects.iter()
    }

    pub fn collection(&self, name: &str) -> Option<&ObjectSchema> {
        self.collections.get(name)
    }

    /// True if `key` is declared at this level in any category.
    pub fn declares(&self, key: &str) -> bool {
        match KeyKind::classify(key) {
            KeyKind::Object => self.objects.contains_key(key),
            KeyKind::Collection => self.collections.contains_key(key),
            KeyKind::Attribute => self.attributes.contains_key(key),
        }
    }

    fn count_objects(&self) -> usize {
        self.objects
            .values()
            .map(|child| 1 + child.count_objects())
            .sum()
    }
}

impl AttributeSpec {
    /// Default value ready for insertion, wrapped for union types.
    pub fn literal_default(&self) -> Option<Value> {
        match &self.default {
            Some(DefaultValue::Literal(value)) => Some(self.wrap_default(value.clone())),
            _ => None,
        }
    }

    /// Wrap a resolved default into a single-element series for union types.
    pub fn wrap_default(&self, value: Value) -> Value {
        if self.kind.is_union() && !value.is_array() {
            Value::Array(vec![value])
        } else {
            value
        }
    }
}

fn parse_object(map: &Map<String, Value>, path: &str) -> Result<ObjectSchema, SchemaError> {
    let mut schema = ObjectSchema::default();
    for (key, value) in map {
        let key_path = join_path(path, key);
        match KeyKind::classify(key) {
            KeyKind::Object => {
                let child = expect_object(value, &key_path)?;
                schema.objects.insert(key.clone(), parse_object(child, &key_path)?);
            }
            KeyKind::Collection => {
                let child = expect_object(value, &key_path)?;
                schema
                    .collections
                    .insert(key.clone(), parse_object(child, &key_path)?);
            }
            KeyKind::Attribute => {
                let spec = parse_attribute(value, &key_path)?;
                schema.attributes.insert(key.clone(), spec);
            }
        }
    }
    check_references(&schema, path)?;
    Ok(schema)
}

fn parse_attribute(value: &Value, path: &str) -> Result<AttributeSpec, SchemaError> {
    let map = expect_object(value, path)?;
    ensure_allowed_keys(map, ATTRIBUTE_KEYS, path)?;

    let type_path = join_path(path, "type");
    let kind = map
        .get("type")
        .ok_or_else(|| invalid_entry(&type_path, "missing required field"))?;
    let kind = AttributeType::from_value(kind)
        .ok_or_else(|| invalid_entry(&type_path, "unknown type"))?;

    let min = map
        .get("min")
        .map(|value| expect_number(value, &join_path(path, "min")))
        .transpose()?;
    let max = map
        .get("max")
        .map(|value| expect_number(value, &join_path(path, "max")))
        .transpose()?;
    let restrict_to = match map.get("restrict_to") {
        Some(value) => Some(expect_array(value, &join_path(path, "restrict_to"))?.clone()),
        None => None,
    };
    let required = match map.get("required") {
        Some(Value::Bool(flag)) => *flag,
        Some(_) => return Err(invalid_entry(&join_path(path, "required"), "expected bool")),
        None => false,
    };
    let depends_on = match map.get("depends_on") {
        Some(value) => expect_names(value, &join_path(path, "depends_on"))?,
        None => Vec::new(),
    };
    let replacement_sets = match map.get("replacement_sets") {
        Some(value) => {
            let sets_path = join_path(path, "replacement_sets");
            let sets = expect_array(value, &sets_path)?;
            let parsed = sets
                .iter()
                .enumerate()
                .map(|(idx, set)| expect_names(set, &format!("{sets_path}[{idx}]")))
                .collect::<Result<Vec<_>, _>>()?;
            Some(parsed)
        }
        None => None,
    };
    let default = map
        .get("default")
        .filter(|value| !value.is_null())
        .map(|value| parse_default(value, kind));
    let description = map
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(AttributeSpec {
        kind,
        min,
        max,
        restrict_to,
        required,
        default,
        depends_on,
        replacement_sets,
        description,
    })
}

/// A string default with spaces on a non-string attribute names another
/// input, e.g. `"Site latitude"`.
fn parse_default(value: &Value, kind: AttributeType) -> DefaultValue {
    match value {
        Value::String(text) if kind.scalar() != Primitive::Str && text.contains(' ') => {
            DefaultValue::Reference(text.split_whitespace().map(str::to_string).collect())
        }
        _ => DefaultValue::Literal(value.clone()),
    }
}

/// Ensure dependency and replacement names refer to sibling attributes.
fn check_references(schema: &ObjectSchema, path: &str) -> Result<(), SchemaError> {
    for (name, spec) in &schema.attributes {
        let referenced = spec
            .depends_on
            .iter()
            .chain(spec.replacement_sets.iter().flatten().flatten());
        for other in referenced {
            if !schema.attributes.contains_key(other) {
                return Err(invalid_entry(
                    &join_path(path, name),
                    &format!("references unknown attribute '{other}'"),
                ));
            }
        }
    }
    Ok(())
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_entry(path, "expected object")),
    }
}

fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, SchemaError> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(invalid_entry(path, "expected array")),
    }
}

fn expect_number(value: &Value, path: &str) -> Result<Number, SchemaError> {
    match value {
        Value::Number(number) => Ok(number.clone()),
        _ => Err(invalid_entry(path, "expected number")),
    }
}

fn expect_names(value: &Value, path: &str) -> Result<Vec<String>, SchemaError> {
    let items = expect_array(value, path)?;
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid_entry(&format!("{path}[{idx}]"), "expected string"))
        })
        .collect()
}

fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
) -> Result<(), SchemaError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_entry(&join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid_entry(path: &str, message: &str) -> SchemaError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    SchemaError::InvalidEntry {
        path: normalized_path.to_string(),
        message: message.to_string(),
    }
}
