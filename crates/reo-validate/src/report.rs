//! Findings collected during one validation run.

use reo_schema::ObjectPath;
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary line placed above the individual input errors.
pub const INVALID_INPUTS_MESSAGE: &str = "Invalid inputs. See 'input_errors'.";

/// A non-fatal finding about one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputWarning {
    pub detail: String,
    pub path: ObjectPath,
}

/// Fatal errors and the four warning categories of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    /// Rate-structure errors, reported after `errors`.
    pub urdb_errors: Vec<String>,
    pub defaults_inserted: Vec<InputWarning>,
    pub invalid_inputs: Vec<InputWarning>,
    pub resampled_inputs: Vec<InputWarning>,
    pub input_as_none: Vec<InputWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when neither kind of fatal error was recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.urdb_errors.is_empty()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn urdb_error(&mut self, message: impl Into<String>) {
        self.urdb_errors.push(message.into());
    }

    pub fn default_inserted(&mut self, detail: impl Into<String>, path: &ObjectPath) {
        self.defaults_inserted.push(warning(detail, path));
    }

    pub fn invalid_input(&mut self, detail: impl Into<String>, path: &ObjectPath) {
        self.invalid_inputs.push(warning(detail, path));
    }

    pub fn resampled(&mut self, detail: impl Into<String>, path: &ObjectPath) {
        self.resampled_inputs.push(warning(detail, path));
    }

    pub fn input_as_none(&mut self, detail: impl Into<String>, path: &ObjectPath) {
        self.input_as_none.push(warning(detail, path));
    }

    /// All fatal messages, tariff errors last.
    pub fn input_errors(&self) -> Vec<String> {
        self.errors
            .iter()
            .chain(&self.urdb_errors)
            .cloned()
            .collect()
    }

    /// Render the report the way callers display it.
    pub fn messages(&self) -> ReportMessages {
        let input_errors = self.input_errors();
        ReportMessages {
            error: (!input_errors.is_empty()).then(|| INVALID_INPUTS_MESSAGE.to_string()),
            input_errors,
            warnings: WarningMessages {
                defaults_inserted: by_path(&self.defaults_inserted),
                invalid_inputs: by_path(&self.invalid_inputs),
                resampled_inputs: by_path(&self.resampled_inputs),
                input_as_none: by_path(&self.input_as_none),
            },
        }
    }
}

/// Serializable rendering of a `ValidationReport`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportMessages {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub input_errors: Vec<String>,
    #[serde(skip_serializing_if = "WarningMessages::is_empty")]
    pub warnings: WarningMessages,
}

/// Warnings grouped by path; messages on one path are joined with ` AND `.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarningMessages {
    #[serde(
        rename = "Default values used for the following:",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub defaults_inserted: BTreeMap<String, String>,
    #[serde(
        rename = "Following inputs are invalid:",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub invalid_inputs: BTreeMap<String, String>,
    #[serde(
        rename = "Following inputs were resampled:",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub resampled_inputs: BTreeMap<String, String>,
    #[serde(
        rename = "Following inputs were null and removed:",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub input_as_none: BTreeMap<String, String>,
}

impl WarningMessages {
    pub fn is_empty(&self) -> bool {
        self.defaults_inserted.is_empty()
            && self.invalid_inputs.is_empty()
            && self.resampled_inputs.is_empty()
            && self.input_as_none.is_empty()
    }
}

fn warning(detail: impl Into<String>, path: &ObjectPath) -> InputWarning {
    InputWarning {
        detail: detail.into(),
        path: path.clone(),
    }
}

fn by_path(warnings: &[InputWarning]) -> BTreeMap<String, String> {
    let mut output: BTreeMap<String, String> = BTreeMap::new();
    for warning in warnings {
        output
            .entry(warning.path.to_string())
            .and_modify(|joined| {
                joined.push_str(" AND ");
                joined.push_str(&warning.detail);
            })
            .or_insert_with(|| warning.detail.clone());
    }
    output
}
