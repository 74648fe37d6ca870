//! Path-addressed view over the document being validated.

use reo_schema::ObjectPath;
use serde_json::{Map, Value};

/// The input document, mutated in place by the validation passes.
///
/// Objects are addressed by `ObjectPath`; attributes by `(path, key)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    root: Value,
}

impl ConfigTree {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Value stored at `path`, if every step is an object holding the next name.
    pub fn node(&self, path: &ObjectPath) -> Option<&Value> {
        self.resolve(path.names())
    }

    /// Walk `names` from the root through nested objects.
    pub fn resolve(&self, names: &[String]) -> Option<&Value> {
        let mut current = &self.root;
        for name in names {
            current = current.as_object()?.get(name)?;
        }
        Some(current)
    }

    pub fn object(&self, path: &ObjectPath) -> Option<&Map<String, Value>> {
        self.node(path)?.as_object()
    }

    pub fn object_mut(&mut self, path: &ObjectPath) -> Option<&mut Map<String, Value>> {
        let mut current = &mut self.root;
        for name in path.names() {
            current = current.as_object_mut()?.get_mut(name)?;
        }
        current.as_object_mut()
    }

    pub fn get(&self, path: &ObjectPath, key: &str) -> Option<&Value> {
        self.object(path)?.get(key)
    }

    /// Insert `value` under `key` in the object at `path`.
    ///
    /// Returns false when no object exists at `path`.
    pub fn set(&mut self, path: &ObjectPath, key: &str, value: Value) -> bool {
        match self.object_mut(path) {
            Some(map) => {
                map.insert(key.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, path: &ObjectPath, key: &str) -> Option<Value> {
        self.object_mut(path)?.remove(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }
}
