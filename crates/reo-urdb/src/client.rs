//! Blocking client for the OpenEI utility rate database.

use crate::{RateLookup, RateLookupError, RateQuery};
use log::{debug, warn};
use reo_config::UrdbSettings;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

/// Looks rates up over HTTP.
#[derive(Clone)]
pub struct UrdbClient {
    base_url: String,
    api_key: Option<String>,
    api_version: u32,
    http: Client,
}

impl std::fmt::Debug for UrdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrdbClient")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl UrdbClient {
    pub fn from_settings(settings: &UrdbSettings) -> Result<Self, RateLookupError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().filter(|key| !key.trim().is_empty()),
            api_version: settings.api_version,
            http,
        })
    }

    /// Fetch rate items matching `params`.
    fn fetch_items(&self, params: &[(&str, &str)]) -> Result<Vec<Value>, RateLookupError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(RateLookupError::Unavailable(
                "no URDB api_key configured".to_string(),
            ));
        };
        let version = self.api_version.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("version", version.as_str()),
            ("format", "json"),
            ("detail", "full"),
            ("api_key", api_key),
        ];
        query.extend_from_slice(params);

        let resp = self.http.get(&self.base_url).query(&query).send()?;
        if !resp.status().is_success() {
            warn!("URDB request failed with status {}", resp.status());
            return Err(RateLookupError::Status(resp.status().as_u16()));
        }
        let body = resp.json::<Value>()?;
        if let Some(message) = body.pointer("/error/message").and_then(Value::as_str) {
            return Err(RateLookupError::Decode(message.to_string()));
        }
        match body.get("items") {
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(_) => Err(RateLookupError::Decode(
                "URDB response items is not an array".to_string(),
            )),
            None => Ok(Vec::new()),
        }
    }
}

impl RateLookup for UrdbClient {
    fn lookup(&self, query: &RateQuery) -> Result<Option<Value>, RateLookupError> {
        match query {
            RateQuery::Label(label) => {
                debug!("URDB lookup by label {label}");
                let items = self.fetch_items(&[("getpage", label.as_str())])?;
                Ok(items.into_iter().next())
            }
            RateQuery::UtilityRate { utility, rate } => {
                debug!("URDB lookup for {utility} / {rate}");
                let items = self.fetch_items(&[("ratesforutility", utility.as_str())])?;
                Ok(select_rate(items, rate))
            }
        }
    }
}

/// Pick the named rate with the most recent start date.
fn select_rate(items: Vec<Value>, rate_name: &str) -> Option<Value> {
    items
        .into_iter()
        .filter(|item| item.get("name").and_then(Value::as_str) == Some(rate_name))
        .max_by_key(|item| item.get("startdate").and_then(Value::as_i64).unwrap_or(0))
}
