//! Business rules tied to individual object types.
//!
//! Rules run after the generic passes, so values are typed, defaulted and
//! range-checked. Each rule is looked up by the last name of the object path.

use super::is_present;
use crate::services::LoadProfileRequest;
use crate::timeseries::HOURS_PER_YEAR;
use crate::walker::{Pass, PassContext};
use log::{debug, warn};
use regex::Regex;
use reo_schema::{ObjectPath, ObjectSchema};
use reo_urdb::RateQuery;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use uuid::Uuid;

type Rule = fn(&ObjectPath, &mut PassContext<'_>);

/// Object name to rule.
const RULES: &[(&str, Rule)] = &[
    ("Scenario", scenario_rule),
    ("Site", site_rule),
    ("Wind", wind_rule),
    ("Generator", generator_rule),
    ("ElectricTariff", electric_tariff_rule),
    ("LoadProfile", load_profile_rule),
];

static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-0-9a-zA-Z.  $:;)(*&#_!@]*$").expect("description pattern is valid")
});

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-zA-Z. ]*$").expect("address pattern is valid"));

/// Resource series a wind system must supply together.
const WIND_RESOURCE_SERIES: &[&str] = &[
    "wind_meters_per_sec",
    "wind_direction_degrees",
    "temperature_celsius",
    "pressure_atmospheres",
];

/// Load series checked on a load profile.
const LOAD_SERIES: &[&str] = &["critical_loads_kw", "loads_kw"];

const BLENDED_DEMAND: &str = "blended_monthly_demand_charges_us_dollars_per_kw";
const BLENDED_ENERGY: &str = "blended_monthly_rates_us_dollars_per_kwh";

/// Year of the reference building load profiles.
const DOE_REFERENCE_YEAR: i64 = 2017;

/// Applies the rule registered for the visited object, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecialCaseRules;

impl Pass for SpecialCaseRules {
    fn name(&self) -> &'static str {
        "special_case_rules"
    }

    fn visit(&self, path: &ObjectPath, _schema: &ObjectSchema, ctx: &mut PassContext<'_>) {
        let Some(tail) = path.tail() else {
            return;
        };
        if ctx.tree.object(path).is_none() {
            return;
        }
        if let Some((_, rule)) = RULES.iter().find(|(name, _)| *name == tail) {
            debug!("applying {tail} rule at {path}");
            rule(path, ctx);
        }
    }
}

fn node(ctx: &PassContext<'_>, path: &ObjectPath) -> Map<String, Value> {
    ctx.tree.object(path).cloned().unwrap_or_default()
}

fn number(node: &Map<String, Value>, key: &str) -> Option<f64> {
    node.get(key).and_then(Value::as_f64)
}

fn non_empty_str<'a>(node: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    node.get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

fn non_empty_array<'a>(node: &'a Map<String, Value>, key: &str) -> Option<&'a Vec<Value>> {
    node.get(key)
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
}

fn scenario_rule(path: &ObjectPath, ctx: &mut PassContext<'_>) {
    let scenario = node(ctx, path);
    if let Some(user_uuid) = scenario.get("user_uuid").and_then(Value::as_str) {
        if Uuid::parse_str(user_uuid).is_err() {
            ctx.report.error("user_uuid must be a valid UUID");
        }
    }
    if let Some(description) = scenario.get("description").and_then(Value::as_str) {
        if !DESCRIPTION_RE.is_match(description) {
            ctx.report.error(
                "description can include enlisted special characters: [-0-9a-zA-Z.  $:;)(*&#_!@] and can have 0-9, a-z, A-Z, periods, and spaces.",
            );
        }
    }
}

fn site_rule(path: &ObjectPath, ctx: &mut PassContext<'_>) {
    let site = node(ctx, path);
    if let Some(address) = site.get("address").and_then(Value::as_str) {
        if !ADDRESS_RE.is_match(address) {
            ctx.report.error(
                "Site address must not include special characters. Restricted to 0-9, a-z, A-Z, periods, and spaces.",
            );
        }
    }
}

/// Size class of a wind turbine for an average site load.
pub(crate) fn wind_size_class(average_load_kw: f64) -> &'static str {
    if average_load_kw <= 12.5 {
        "residential"
    } else if average_load_kw <= 100.0 {
        "commercial"
    } else if average_load_kw <= 1000.0 {
        "medium"
    } else {
        "large"
    }
}

fn wind_rule(path: &ObjectPath, ctx: &mut PassContext<'_>) {
    let wind = node(ctx, path);
    if !number(&wind, "max_kw").is_some_and(|max_kw| max_kw > 0.0) {
        return;
    }

    if non_empty_array(&wind, "wind_meters_per_sec").is_some() {
        for series in WIND_RESOURCE_SERIES {
            if non_empty_array(&wind, series).is_some() {
                ctx.normalize_series(path, series);
            } else {
                ctx.report.error(format!(
                    "{series} must be provided in {path} when wind_meters_per_sec is provided"
                ));
            }
        }
        return;
    }

    let Some(site_path) = path.parent() else {
        return;
    };
    let site = node(ctx, &site_path);
    let latitude = number(&site, "latitude");
    let longitude = number(&site, "longitude");

    if !is_present(&wind, "size_class") {
        let load_path = site_path.child("LoadProfile");
        if let Some(average) = average_load_kw(&load_path, latitude, longitude, ctx) {
            let size_class = wind_size_class(average);
            debug!("wind size class {size_class} from average load {average} kW");
            ctx.tree.set(path, "size_class", Value::from(size_class));
        }
    }

    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return;
    };
    if let Err(err) = ctx.services.siting.check_site(latitude, longitude) {
        warn!("wind siting failed for ({latitude}, {longitude}): {err}");
        ctx.report.error(err.to_string());
    }
}

/// Average site load from annual energy, explicit loads, or a built-in
/// profile. A fetched built-in profile is stored as the site's loads.
fn average_load_kw(
    load_path: &ObjectPath,
    latitude: Option<f64>,
    longitude: Option<f64>,
    ctx: &mut PassContext<'_>,
) -> Option<f64> {
    let load_profile = node(ctx, load_path);
    if let Some(annual_kwh) = number(&load_profile, "annual_kwh") {
        return Some(annual_kwh / HOURS_PER_YEAR as f64);
    }
    if let Some(loads) = non_empty_array(&load_profile, "loads_kw") {
        let values: Vec<f64> = loads.iter().filter_map(Value::as_f64).collect();
        return mean(&values);
    }

    let request = LoadProfileRequest {
        latitude: latitude?,
        longitude: longitude?,
        parameters: load_profile,
    };
    match ctx.services.load_profiles.built_in_profile(&request) {
        Ok(profile) => {
            let average = mean(&profile);
            let loads = profile.into_iter().map(Value::from).collect();
            ctx.tree.set(load_path, "loads_kw", Value::Array(loads));
            average
        }
        Err(err) => {
            warn!("built-in load profile unavailable: {err}");
            ctx.report.error(err.to_string());
            None
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn generator_rule(path: &ObjectPath, ctx: &mut PassContext<'_>) {
    if !ctx.report.is_valid() {
        return;
    }
    let generator = node(ctx, path);
    let max_kw = number(&generator, "max_kw").unwrap_or(0.0);
    let existing_kw = number(&generator, "existing_kw").unwrap_or(0.0);
    if max_kw <= 0.0 && existing_kw <= 0.0 {
        return;
    }

    let min_kw = number(&generator, "min_kw").unwrap_or(0.0);
    let (slope, intercept) = ctx
        .services
        .fuel_burn
        .default_fuel_burn_rate(min_kw + existing_kw);
    if number(&generator, "fuel_slope_gal_per_kwh").unwrap_or(0.0) == 0.0 {
        ctx.tree
            .set(path, "fuel_slope_gal_per_kwh", Value::from(slope));
    }
    if number(&generator, "fuel_intercept_gal_per_hr").unwrap_or(0.0) == 0.0 {
        ctx.tree
            .set(path, "fuel_intercept_gal_per_hr", Value::from(intercept));
    }
}

fn load_profile_rule(path: &ObjectPath, ctx: &mut PassContext<'_>) {
    let load_profile = node(ctx, path);
    if let (Some(start), Some(end)) = (
        load_profile.get("outage_start_hour"),
        load_profile.get("outage_end_hour"),
    ) {
        let same = match (start.as_f64(), end.as_f64()) {
            (Some(start), Some(end)) => start == end,
            _ => start == end,
        };
        if same {
            ctx.report
                .error("LoadProfile outage_start_hour and outage_end_hour cannot be the same");
        }
    }

    for series in LOAD_SERIES {
        if non_empty_array(&load_profile, series).is_none() {
            continue;
        }
        ctx.normalize_series(path, series);

        let is_net = load_profile
            .get(&format!("{series}_is_net"))
            .and_then(Value::as_bool)
            .unwrap_or(true);
        if is_net || !ctx.report.is_valid() {
            continue;
        }
        let negative = ctx
            .tree
            .get(path, series)
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().filter_map(Value::as_f64).any(|load| load < 0.0));
        if negative {
            ctx.report.error(format!(
                "{series} must contain loads greater than or equal to zero."
            ));
        }
    }

    if is_present(&load_profile, "doe_reference_name") {
        ctx.tree.set(path, "year", Value::from(DOE_REFERENCE_YEAR));
    }
}

fn electric_tariff_rule(path: &ObjectPath, ctx: &mut PassContext<'_>) {
    let tariff = node(ctx, path);

    let document = if let Some(document) = tariff.get("urdb_response").filter(|v| !v.is_null()) {
        Some(document.clone())
    } else if let Some(label) = non_empty_str(&tariff, "urdb_label") {
        fetch_rate(
            path,
            RateQuery::label(label),
            format!(
                "Unable to download {label} from URDB. Please check the input value for 'urdb_label'."
            ),
            ctx,
        )
    } else if let (Some(utility), Some(rate)) = (
        non_empty_str(&tariff, "urdb_utility_name"),
        non_empty_str(&tariff, "urdb_rate_name"),
    ) {
        fetch_rate(
            path,
            RateQuery::utility_rate(utility, rate),
            format!(
                "Unable to download {rate} from URDB. Please check the input values for 'urdb_utility_name' and 'urdb_rate_name'."
            ),
            ctx,
        )
    } else {
        None
    };

    if let Some(document) = &document {
        check_rate_document(path, document, ctx);
    }

    let tariff = node(ctx, path);
    if tariff
        .get("add_blended_rates_to_urdb_rate")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        let mut missing = Vec::new();
        if !tariff.contains_key(BLENDED_DEMAND) {
            missing.push(BLENDED_DEMAND);
        }
        if !tariff.contains_key(BLENDED_ENERGY) {
            missing.push(BLENDED_ENERGY);
        }
        if !tariff.contains_key("urdb_response") {
            missing.push("urdb_response OR urdb_label OR urdb_utility_name and urdb_rate_name");
        }
        if !missing.is_empty() {
            ctx.report.error(format!(
                "add_blended_rates_to_urdb_rate is set to 'true' yet missing valid entries for the following inputs: {}",
                missing.join(", ")
            ));
        }
    }

    for blended in [BLENDED_DEMAND, BLENDED_ENERGY] {
        if let Some(months) = non_empty_array(&tariff, blended) {
            if months.len() != 12 {
                ctx.report
                    .error(format!("{blended} array needs to contain 12 valid numbers."));
            }
        }
    }
}

/// Look a rate up and store it as the tariff's `urdb_response`.
fn fetch_rate(
    path: &ObjectPath,
    query: RateQuery,
    not_found: String,
    ctx: &mut PassContext<'_>,
) -> Option<Value> {
    match ctx.services.rates.lookup(&query) {
        Ok(Some(document)) => {
            ctx.tree.set(path, "urdb_response", document.clone());
            Some(document)
        }
        Ok(None) => {
            ctx.report.urdb_error(not_found);
            None
        }
        Err(err) => {
            warn!("rate lookup failed for {query:?}: {err}");
            ctx.report.urdb_error(not_found);
            None
        }
    }
}

/// Copy utility and rate names from the document, then validate it.
fn check_rate_document(path: &ObjectPath, document: &Value, ctx: &mut PassContext<'_>) {
    let tariff = node(ctx, path);
    for (key, source) in [("urdb_utility_name", "utility"), ("urdb_rate_name", "name")] {
        if is_present(&tariff, key) {
            continue;
        }
        if let Some(value) = document.get(source).filter(|value| !value.is_null()) {
            ctx.tree.set(path, key, value.clone());
        }
    }

    match ctx.services.rate_validator.validate(document) {
        Ok(report) => ctx.report.urdb_errors.extend(report.errors),
        Err(err) => {
            warn!("could not check rate structure in {path}: {err}");
            ctx.report
                .urdb_error(format!("Error parsing urdb rate in {path}"));
        }
    }
}
