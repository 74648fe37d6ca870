//! Settings, schema and rate files wired through `build_validator`.

use pretty_assertions::assert_eq;
use reo::config::{LayeredSettingsOptions, ValidatorSettings};
use reo::{RateSource, build_validator};
use serde_json::json;
use std::fs;
use std::path::Path;

const SCHEMA: &str = r#"{
  Scenario: {
    Site: {
      latitude: { type: "float", min: -90, max: 90, required: true },
      longitude: { type: "float", min: -180, max: 180, required: true },
      ElectricTariff: {
        urdb_utility_name: { type: "str" },
        urdb_rate_name: { type: "str" },
        urdb_label: { type: "str" },
        urdb_response: { type: "dict" },
      },
    },
  },
}"#;

fn rates_json() -> String {
    let schedule = json!(vec![vec![0; 24]; 12]);
    let rate = |label: &str, name: &str| {
        json!({
            "label": label,
            "utility": "Xcel Energy",
            "name": name,
            "energyratestructure": [[{"rate": 0.1}]],
            "energyweekdayschedule": schedule,
            "energyweekendschedule": schedule
        })
    };
    json!([
        rate("open-label", "Secondary General"),
        rate("restricted-label", "Restricted")
    ])
    .to_string()
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn settings(cwd: &Path) -> ValidatorSettings {
    let mut options = LayeredSettingsOptions::new(cwd);
    options.system_path = None;
    options.user_path = None;
    ValidatorSettings::load_layered_with_options(options)
        .expect("settings")
        .settings
}

fn scenario(tariff: serde_json::Value) -> serde_json::Value {
    json!({"Scenario": {"Site": {
        "latitude": 39.74,
        "longitude": -105.17,
        "ElectricTariff": tariff
    }}})
}

#[test]
fn rate_file_resolves_labels_and_utility_pairs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write(dir.path(), "schema.json5", SCHEMA);
    let rates = write(dir.path(), "rates.json5", &rates_json());
    let validator = build_validator(
        &settings(dir.path()),
        &schema,
        &RateSource::File(rates),
    )
    .expect("validator");

    let outcome = validator.validate(scenario(json!({"urdb_label": "open-label"})));
    assert!(outcome.is_valid(), "{:?}", outcome.report.urdb_errors);
    let tariff = &outcome.document["Scenario"]["Site"]["ElectricTariff"];
    assert_eq!(tariff["urdb_response"]["label"], json!("open-label"));
    assert_eq!(tariff["urdb_rate_name"], json!("Secondary General"));

    let outcome = validator.validate(scenario(json!({
        "urdb_utility_name": "Xcel Energy",
        "urdb_rate_name": "Secondary General"
    })));
    assert!(outcome.is_valid(), "{:?}", outcome.report.urdb_errors);
}

#[test]
fn restricted_labels_come_from_the_cwd_settings_layer() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "reo.json5",
        "{urdb: {restricted_labels: ['restricted-label']}}",
    );
    let schema = write(dir.path(), "schema.json5", SCHEMA);
    let rates = write(dir.path(), "rates.json5", &rates_json());
    let validator = build_validator(
        &settings(dir.path()),
        &schema,
        &RateSource::File(rates),
    )
    .expect("validator");

    let outcome = validator.validate(scenario(json!({"urdb_label": "restricted-label"})));
    assert_eq!(
        outcome.report.urdb_errors,
        vec![
            "URDB Rate (label=restricted-label) is currently restricted due to performance limitations"
                .to_string()
        ]
    );
}

#[test]
fn offline_validation_reports_lookups_as_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write(dir.path(), "schema.json5", SCHEMA);
    let validator =
        build_validator(&settings(dir.path()), &schema, &RateSource::Offline).expect("validator");

    let outcome = validator.validate(scenario(json!({"urdb_label": "open-label"})));
    assert!(!outcome.is_valid());
    assert_eq!(
        outcome.report.urdb_errors,
        vec![
            "Unable to download open-label from URDB. Please check the input value for 'urdb_label'."
                .to_string()
        ]
    );
}

#[test]
fn summary_carries_the_normalized_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write(dir.path(), "schema.json5", SCHEMA);
    let validator =
        build_validator(&settings(dir.path()), &schema, &RateSource::Offline).expect("validator");

    let outcome = validator.validate(json!({"Scenario": {"Site": {"latitude": "40"}}}));
    let summary = serde_json::to_value(outcome.summary()).expect("json");
    assert_eq!(summary["is_valid"], json!(false));
    assert_eq!(summary["input"]["Scenario"]["Site"]["latitude"], json!(40.0));
    assert_eq!(
        summary["messages"]["error"],
        json!(reo::validate::INVALID_INPUTS_MESSAGE)
    );
}
