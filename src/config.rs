use std::{env, io};

use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::places::PlaceQuery;

pub const PLACE_TYPES: &[&str] = &[
    "Gym",
    "Park",
    "Café",
    "Supermarket",
    "Restaurant",
    "Vegetarian Restaurant",
    "Burger Restaurant",
];

pub const DISTRICT_NAMES: &[&str] = &[
    "Neuehrenfeld, Cologne, Germany",
    "Sülz, Cologne, Germany",
    "Raderthal, Cologne, Germany",
    "Müngersdorf, Cologne, Germany",
    "Südstadt, Cologne, Germany",
    "Zollstock, Cologne, Germany",
];

pub const DEFAULT_MAPS_API_BASE: &str = "https://maps.googleapis.com";
pub const DEFAULT_PAGE_TOKEN_DELAY_MS: u64 = 2_000;
/// Distance Matrix caps destinations per request at 25.
pub const MAX_DISTANCE_BATCH: usize = 25;
const DEFAULT_MAX_RESULT_PAGES: usize = 10;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const LIST_SEPARATOR: char = ';';

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_key: SecretString,
    pub maps_api_base: String,
    pub page_token_delay_ms: u64,
    pub distance_batch_size: usize,
    pub max_result_pages: usize,
    pub http_timeout_secs: u64,
    pub bind_addr: String,
    pub default_place_types: Vec<String>,
    pub default_district_names: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        load_dotenv_if_applicable();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("API_KEY")
            .filter(|v| !v.trim().is_empty())
            .map(|v| SecretString::new(v.into()))
            .ok_or_else(|| AppError::Config("API_KEY is not set".into()))?;

        let default_place_types = parse_list(&lookup, "PLACE_TYPES", PLACE_TYPES)?;
        let default_district_names = parse_list(&lookup, "DISTRICT_NAMES", DISTRICT_NAMES)?;

        Ok(Self {
            api_key,
            maps_api_base: lookup("GOOGLE_MAPS_API_BASE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MAPS_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            page_token_delay_ms: parse_or(&lookup, "PAGE_TOKEN_DELAY_MS", DEFAULT_PAGE_TOKEN_DELAY_MS),
            distance_batch_size: parse_or(&lookup, "DISTANCE_BATCH_SIZE", MAX_DISTANCE_BATCH)
                .clamp(1, MAX_DISTANCE_BATCH),
            max_result_pages: parse_or(&lookup, "MAX_RESULT_PAGES", DEFAULT_MAX_RESULT_PAGES).max(1),
            http_timeout_secs: parse_or(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)
                .max(1),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            default_place_types,
            default_district_names,
        })
    }
}

/// Trigger body as sent by the ingestion pipeline. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionTrigger {
    #[serde(default)]
    pub place_types: Option<Vec<String>>,
    #[serde(default)]
    pub district_names: Option<Vec<String>>,
    #[serde(default)]
    pub state: Option<Map<String, Value>>,
}

/// Categories and districts for one run, after defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPlan {
    pub categories: Vec<String>,
    pub districts: Vec<String>,
}

impl CollectionTrigger {
    pub fn plan(&self, config: &AppConfig) -> AppResult<CollectionPlan> {
        let categories = with_fallback(self.place_types.as_deref(), &config.default_place_types);
        let districts = with_fallback(
            self.district_names.as_deref(),
            &config.default_district_names,
        );
        if categories.is_empty() {
            return Err(AppError::Config("no place types to collect".into()));
        }
        if districts.is_empty() {
            return Err(AppError::Config("no district names to collect".into()));
        }
        Ok(CollectionPlan {
            categories,
            districts,
        })
    }
}

impl CollectionPlan {
    /// Categories outer, districts inner.
    pub fn queries(&self) -> Vec<PlaceQuery> {
        self.categories
            .iter()
            .flat_map(|category| {
                self.districts
                    .iter()
                    .map(move |district| PlaceQuery::new(category.as_str(), district.as_str()))
            })
            .collect()
    }
}

fn with_fallback(requested: Option<&[String]>, defaults: &[String]) -> Vec<String> {
    let cleaned = dedupe(requested.unwrap_or_default().iter().map(String::as_str));
    if cleaned.is_empty() {
        dedupe(defaults.iter().map(String::as_str))
    } else {
        cleaned
    }
}

fn dedupe<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values.map(str::trim).filter(|v| !v.is_empty()) {
        if !out.iter().any(|existing| existing == value) {
            out.push(value.to_string());
        }
    }
    out
}

fn parse_list<F>(lookup: &F, key: &str, defaults: &[&str]) -> AppResult<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => {
            let values = dedupe(raw.split(LIST_SEPARATOR));
            if values.is_empty() {
                Err(AppError::Config(format!("{key} is set but lists no values")))
            } else {
                Ok(values)
            }
        }
        None => Ok(defaults.iter().map(|v| v.to_string()).collect()),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn load_dotenv_if_applicable() {
    if !should_load_dotenv() {
        debug!("skipping .env load outside dev mode");
        return;
    }

    if let Err(err) = dotenvy::dotenv() {
        match &err {
            dotenvy::Error::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {}
            _ => debug!(?err, "unable to load .env file"),
        }
    }
}

fn should_load_dotenv() -> bool {
    cfg!(debug_assertions)
        || env::var("ALLOW_DOTENV")
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
            .unwrap_or(false)
}
