//! Validation of flat URDB-style rate structures.

use crate::RateStructureError;
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

/// Label assumed for rate documents that do not carry one.
pub const DEFAULT_RATE_LABEL: &str = "custom";

/// Keys that price a tier; every tier needs at least one.
const TIER_PRICE_KEYS: &[&str] = &["rate", "sell", "adj"];

/// How a known rate field is checked.
#[derive(Debug, Clone, Copy)]
enum FieldRule {
    /// Array of tier groups.
    Structure,
    /// Period indices into `paired`, nested `counts` deep.
    Schedule {
        paired: &'static str,
        counts: &'static [usize],
    },
}

/// Known fields in validation order.
const FIELD_RULES: &[(&str, FieldRule)] = &[
    (
        "coincidentrateschedule",
        FieldRule::Schedule {
            paired: "coincidentratestructure",
            counts: &[],
        },
    ),
    ("coincidentratestructure", FieldRule::Structure),
    ("demandratestructure", FieldRule::Structure),
    (
        "demandweekdayschedule",
        FieldRule::Schedule {
            paired: "demandratestructure",
            counts: &[12, 24],
        },
    ),
    (
        "demandweekendschedule",
        FieldRule::Schedule {
            paired: "demandratestructure",
            counts: &[12, 24],
        },
    ),
    ("energyratestructure", FieldRule::Structure),
    (
        "energyweekdayschedule",
        FieldRule::Schedule {
            paired: "energyratestructure",
            counts: &[12, 24],
        },
    ),
    (
        "energyweekendschedule",
        FieldRule::Schedule {
            paired: "energyratestructure",
            counts: &[12, 24],
        },
    ),
    (
        "flatdemandmonths",
        FieldRule::Schedule {
            paired: "flatdemandstructure",
            counts: &[12],
        },
    ),
    ("flatdemandstructure", FieldRule::Structure),
];

/// Fields that require other fields to be present.
const DEPENDENCIES: &[(&str, &[&str])] = &[
    ("demandweekdayschedule", &["demandratestructure"]),
    ("demandweekendschedule", &["demandratestructure"]),
    (
        "demandratestructure",
        &["demandweekdayschedule", "demandweekendschedule"],
    ),
    ("energyweekdayschedule", &["energyratestructure"]),
    ("energyweekendschedule", &["energyratestructure"]),
    (
        "energyratestructure",
        &["energyweekdayschedule", "energyweekendschedule"],
    ),
    ("flatdemandmonths", &["flatdemandstructure"]),
    ("flatdemandstructure", &["flatdemandmonths"]),
];

/// Findings for one rate document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RateReport {
    pub label: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl RateReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validator for flat rate documents.
#[derive(Debug, Clone, Default)]
pub struct RateStructureValidator {
    restricted_labels: HashSet<String>,
}

impl RateStructureValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject documents whose label is in `labels`.
    pub fn with_restricted_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.restricted_labels
            .extend(labels.into_iter().map(Into::into));
        self
    }

    /// Check every known field present in `document`.
    ///
    /// Findings are returned in the report; `Err` means the document shape
    /// prevented checking altogether.
    pub fn validate(&self, document: &Value) -> Result<RateReport, RateStructureError> {
        let rate = document.as_object().ok_or(RateStructureError::NotAnObject)?;
        let label = rate
            .get("label")
            .and_then(Value::as_str)
            .filter(|label| !label.is_empty())
            .unwrap_or(DEFAULT_RATE_LABEL)
            .to_string();

        let mut check = RateCheck {
            rate,
            errors: Vec::new(),
            warnings: Vec::new(),
        };
        if self.restricted_labels.contains(&label) {
            check.errors.push(format!(
                "URDB Rate (label={label}) is currently restricted due to performance limitations"
            ));
        }

        for (field, rule) in FIELD_RULES {
            if !check.present(field) {
                continue;
            }
            match rule {
                FieldRule::Structure => {
                    if check.dependencies_met(field) {
                        check.tiers(field)?;
                    }
                }
                FieldRule::Schedule { paired, counts } => {
                    if !counts.is_empty() {
                        check.complete_entries(field, counts);
                    }
                    if check.dependencies_met(field) {
                        check.schedule(field, paired)?;
                    }
                }
            }
        }

        let report = RateReport {
            label,
            errors: check.errors,
            warnings: check.warnings,
        };
        if !report.errors.is_empty() || !report.warnings.is_empty() {
            warn!(
                "rate structure findings (label={}, errors={}, warnings={})",
                report.label,
                report.errors.len(),
                report.warnings.len()
            );
            for message in report.errors.iter().chain(&report.warnings) {
                debug!("rate {}: {}", report.label, message);
            }
        }
        Ok(report)
    }
}

/// Working state while checking one document.
struct RateCheck<'a> {
    rate: &'a Map<String, Value>,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl<'a> RateCheck<'a> {
    fn field(&self, name: &str) -> Option<&'a Value> {
        self.rate.get(name).filter(|value| !value.is_null())
    }

    fn present(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Record every missing dependency of `name`; true when none are missing.
    fn dependencies_met(&mut self, name: &str) -> bool {
        let Some((_, required)) = DEPENDENCIES.iter().find(|(field, _)| *field == name) else {
            return true;
        };
        let mut met = true;
        for dependency in required.iter() {
            if !self.present(dependency) {
                self.errors
                    .push(format!("Missing {dependency} a dependency of {name}"));
                met = false;
            }
        }
        met
    }

    /// Tier groups: non-empty, priced, and exactly one open-ended tier.
    fn tiers(&mut self, name: &str) -> Result<(), RateStructureError> {
        let groups = self
            .field(name)
            .and_then(Value::as_array)
            .ok_or_else(|| malformed(name, "expected an array of rates"))?;

        for (idx, group) in groups.iter().enumerate() {
            let tiers = group
                .as_array()
                .ok_or_else(|| malformed(name, &format!("rate {idx} is not an array of tiers")))?;
            if tiers.is_empty() {
                self.errors
                    .push(format!("Missing rate information for rate {idx} in {name}"));
                continue;
            }

            let mut bounded = 0;
            for (tier_idx, tier) in tiers.iter().enumerate() {
                let tier = tier.as_object().ok_or_else(|| {
                    malformed(name, &format!("tier {tier_idx} in rate {idx} is not an object"))
                })?;
                if has_value(tier, "max") {
                    bounded += 1;
                }
                if !TIER_PRICE_KEYS.iter().any(|key| has_value(tier, key)) {
                    self.errors.push(format!(
                        "Missing rate/sell/adj attributes for tier {tier_idx} in rate {idx} {name}"
                    ));
                }
            }

            if tiers.len() > 1 {
                let expected = tiers.len() - 1;
                if bounded < expected {
                    self.errors.push(format!(
                        "Missing 'max' tag for {} tiers in rate {idx} for {name}",
                        expected - bounded
                    ));
                } else if bounded > expected {
                    self.errors.push(format!(
                        "Found 'max' tag on all {} tiers in rate {idx} for {name}; the top tier must be open-ended",
                        tiers.len()
                    ));
                }
            }
        }
        Ok(())
    }

    /// Nested arrays must hold `counts[level]` entries at each level.
    fn complete_entries(&mut self, name: &str, counts: &[usize]) {
        if let Some(value) = self.field(name).cloned() {
            self.count_level(name, &value, counts, 0, 0);
        }
    }

    fn count_level(&mut self, name: &str, item: &Value, counts: &[usize], level: usize, entry: usize) {
        let Value::Array(items) = item else {
            return;
        };
        let Some(&expected) = counts.get(level) else {
            return;
        };
        if items.len() != expected {
            let sublevel = if level > 0 {
                format!("in sublevel {level} ")
            } else {
                String::new()
            };
            self.errors.push(format!(
                "Entry {entry} {sublevel}{name} does not contain {expected} entries"
            ));
        }
        for (idx, sub) in items.iter().enumerate() {
            self.count_level(name, sub, counts, level + 1, idx);
        }
    }

    /// Every distinct period in the schedule must index a rate in `paired`.
    fn schedule(&mut self, name: &str, paired: &str) -> Result<(), RateStructureError> {
        let mut periods = BTreeSet::new();
        if let Some(value) = self.field(name) {
            collect_periods(name, value, &mut periods)?;
        }

        let Some(structure) = self.field(paired) else {
            self.warnings
                .push(format!("{paired} does not exist to check {name}"));
            return Ok(());
        };
        let rate_count = structure
            .as_array()
            .map(Vec::len)
            .ok_or_else(|| malformed(paired, "expected an array of rates"))?;

        for period in periods {
            if period < 0 || period >= rate_count as i64 {
                self.errors.push(format!(
                    "{name} contains value {period} which has no associated rate in {paired}"
                ));
            }
        }
        Ok(())
    }
}

fn has_value(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_some_and(|value| !value.is_null())
}

/// Flatten nested schedule arrays into their distinct period values.
fn collect_periods(
    name: &str,
    value: &Value,
    periods: &mut BTreeSet<i64>,
) -> Result<(), RateStructureError> {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_periods(name, item, periods)?;
            }
            Ok(())
        }
        Value::Number(number) => {
            let period = number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|raw| raw.fract() == 0.0)
                    .map(|raw| raw as i64)
            });
            let period = period
                .ok_or_else(|| malformed(name, &format!("period {number} is not an integer")))?;
            periods.insert(period);
            Ok(())
        }
        other => Err(malformed(name, &format!("period {other} is not a number"))),
    }
}

fn malformed(field: &str, reason: &str) -> RateStructureError {
    RateStructureError::Malformed {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
