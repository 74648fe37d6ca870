//! Rate lookup collaborators.

use crate::RateLookupError;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// What to look up: a rate label, or a utility and rate name pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RateQuery {
    Label(String),
    UtilityRate { utility: String, rate: String },
}

impl RateQuery {
    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }

    pub fn utility_rate(utility: impl Into<String>, rate: impl Into<String>) -> Self {
        Self::UtilityRate {
            utility: utility.into(),
            rate: rate.into(),
        }
    }
}

/// Resolves a query to a raw rate document.
///
/// `Ok(None)` means the service answered but knows no such rate.
pub trait RateLookup: Send + Sync {
    fn lookup(&self, query: &RateQuery) -> Result<Option<Value>, RateLookupError>;
}

/// In-memory lookup keyed by label and by `(utility, name)`.
#[derive(Debug, Clone, Default)]
pub struct StaticRateLookup {
    by_label: HashMap<String, Value>,
    by_utility: HashMap<(String, String), Value>,
}

impl StaticRateLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a document by its `label`, `utility` and `name` fields.
    pub fn insert(&mut self, document: Value) {
        let label = document.get("label").and_then(Value::as_str);
        let utility = document.get("utility").and_then(Value::as_str);
        let name = document.get("name").and_then(Value::as_str);
        if let (Some(utility), Some(name)) = (utility, name) {
            self.by_utility
                .insert((utility.to_string(), name.to_string()), document.clone());
        }
        if let Some(label) = label {
            self.by_label.insert(label.to_string(), document);
        }
    }

    pub fn with_document(mut self, document: Value) -> Self {
        self.insert(document);
        self
    }

    pub fn from_documents(documents: impl IntoIterator<Item = Value>) -> Self {
        let mut lookup = Self::new();
        for document in documents {
            lookup.insert(document);
        }
        lookup
    }

    /// Load a JSON5 file holding either one rate document or an array of them.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, RateLookupError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let value: Value = json5::from_str(&contents)?;
        let lookup = match value {
            Value::Array(documents) => Self::from_documents(documents),
            Value::Object(_) => Self::new().with_document(value),
            _ => {
                return Err(RateLookupError::Decode(format!(
                    "{}: expected a rate object or an array of rates",
                    path.as_ref().display()
                )));
            }
        };
        debug!(
            "loaded {} rate documents from {}",
            lookup.by_label.len().max(lookup.by_utility.len()),
            path.as_ref().display()
        );
        Ok(lookup)
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty() && self.by_utility.is_empty()
    }
}

impl RateLookup for StaticRateLookup {
    fn lookup(&self, query: &RateQuery) -> Result<Option<Value>, RateLookupError> {
        let found = match query {
            RateQuery::Label(label) => self.by_label.get(label),
            RateQuery::UtilityRate { utility, rate } => {
                self.by_utility.get(&(utility.clone(), rate.clone()))
            }
        };
        Ok(found.cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_rate() -> Value {
        json!({
            "label": "539f6a23ec4f024411ec8bf9",
            "utility": "Pacific Gas & Electric Co",
            "name": "E-19 Medium General Demand TOU (Secondary)",
            "energyratestructure": [[{"rate": 0.1}]],
        })
    }

    #[test]
    fn finds_by_label_and_by_utility_pair() {
        let lookup = StaticRateLookup::new().with_document(sample_rate());
        let by_label = lookup
            .lookup(&RateQuery::label("539f6a23ec4f024411ec8bf9"))
            .expect("lookup");
        assert_eq!(by_label, Some(sample_rate()));

        let by_pair = lookup
            .lookup(&RateQuery::utility_rate(
                "Pacific Gas & Electric Co",
                "E-19 Medium General Demand TOU (Secondary)",
            ))
            .expect("lookup");
        assert_eq!(by_pair, Some(sample_rate()));
    }

    #[test]
    fn unknown_query_is_not_found() {
        let lookup = StaticRateLookup::from_documents([sample_rate()]);
        assert_eq!(
            lookup.lookup(&RateQuery::label("missing")).expect("lookup"),
            None
        );
    }

    #[test]
    fn loads_json5_catalog() {
        let temp = TempDir::new().expect("tmp");
        let path = temp.path().join("rates.json5");
        fs::write(
            &path,
            "[ { label: 'a', energyratestructure: [[{ rate: 1 }]] }, // trailing\n { label: 'b' } ]",
        )
        .expect("write");

        let lookup = StaticRateLookup::load_from_path(&path).expect("load");
        assert!(lookup.lookup(&RateQuery::label("b")).expect("lookup").is_some());
        assert!(!lookup.is_empty());
    }

    #[test]
    fn rejects_scalar_catalog() {
        let temp = TempDir::new().expect("tmp");
        let path = temp.path().join("rates.json5");
        fs::write(&path, "42").expect("write");
        assert!(StaticRateLookup::load_from_path(&path).is_err());
    }
}
