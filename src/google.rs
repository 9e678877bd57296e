use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::trace;

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::places::{Coordinates, RawPlaceResult, SearchPage};

const TEXT_SEARCH_PATH: &str = "/maps/api/place/textsearch/json";
const FIND_PLACE_PATH: &str = "/maps/api/place/findplacefromtext/json";
const DISTANCE_MATRIX_PATH: &str = "/maps/api/distancematrix/json";
const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Search, geocoding and distance capabilities of the maps provider.
#[async_trait]
pub trait MapsProvider: Send + Sync {
    /// Fetches one page of text search results.
    async fn search_places(&self, query: &str, page_token: Option<&str>)
        -> AppResult<SearchPage>;

    /// Best location candidate for a free-text district name.
    async fn resolve_center(&self, district: &str) -> AppResult<Option<Coordinates>>;

    /// Walking distances in meters from `origin`, in destination order.
    async fn compute_distances(
        &self,
        origin: Coordinates,
        destinations: &[Coordinates],
    ) -> AppResult<Vec<u64>>;
}

pub struct HttpMapsClient {
    http: Client,
    api_base: String,
    api_key: SecretString,
}

impl HttpMapsClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("city-explorer/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_base: config.maps_api_base.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Request URLs carry the API key, so they are stripped from every error.
    async fn get<T>(&self, path: &str, params: &[(&str, &str)]) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.api_base, path);
        let response = self
            .http
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?
            .error_for_status()
            .map_err(reqwest::Error::without_url)?;
        let parsed = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;
        Ok(parsed)
    }
}

#[async_trait]
impl MapsProvider for HttpMapsClient {
    async fn search_places(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> AppResult<SearchPage> {
        let mut params = vec![("query", query)];
        if let Some(token) = page_token {
            params.push(("pagetoken", token));
        }
        let parsed: TextSearchResponse = self.get(TEXT_SEARCH_PATH, &params).await?;
        if !check_status("textsearch", &parsed.status, parsed.error_message)? {
            return Ok(SearchPage::default());
        }

        let results = parsed
            .results
            .into_iter()
            .map(TextSearchResult::into_raw)
            .collect::<AppResult<Vec<_>>>()?;
        trace!(query, count = results.len(), "text search page received");
        Ok(SearchPage {
            results,
            next_page_token: parsed.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn resolve_center(&self, district: &str) -> AppResult<Option<Coordinates>> {
        let parsed: FindPlaceResponse = self
            .get(
                FIND_PLACE_PATH,
                &[
                    ("input", district),
                    ("inputtype", "textquery"),
                    ("fields", "geometry"),
                ],
            )
            .await?;
        if !check_status("findplacefromtext", &parsed.status, parsed.error_message)? {
            return Ok(None);
        }

        match parsed.candidates.into_iter().next() {
            Some(candidate) => candidate
                .geometry
                .map(|geometry| geometry.location.coordinates())
                .ok_or_else(|| {
                    AppError::MalformedResponse(format!("candidate for {district} has no geometry"))
                })
                .map(Some),
            None => Ok(None),
        }
    }

    async fn compute_distances(
        &self,
        origin: Coordinates,
        destinations: &[Coordinates],
    ) -> AppResult<Vec<u64>> {
        let origins = origin.to_param();
        let destinations = destinations
            .iter()
            .map(|d| d.to_param())
            .collect::<Vec<_>>()
            .join("|");
        let parsed: DistanceMatrixResponse = self
            .get(
                DISTANCE_MATRIX_PATH,
                &[
                    ("origins", origins.as_str()),
                    ("destinations", destinations.as_str()),
                    ("mode", "walking"),
                ],
            )
            .await?;
        check_status("distancematrix", &parsed.status, parsed.error_message)?;

        let row = parsed
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::MalformedResponse("distance matrix has no rows".into()))?;
        row.elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                element.distance.map(|d| d.value).ok_or_else(|| {
                    AppError::MalformedResponse(format!(
                        "no distance for destination {index} ({})",
                        element.status
                    ))
                })
            })
            .collect()
    }
}

/// `Ok(true)` for results, `Ok(false)` for an empty answer, `Err` otherwise.
fn check_status(
    endpoint: &'static str,
    status: &str,
    message: Option<String>,
) -> AppResult<bool> {
    match status {
        STATUS_OK => Ok(true),
        STATUS_ZERO_RESULTS => Ok(false),
        other => Err(AppError::ProviderRejected {
            endpoint,
            status: other.to_string(),
            message,
        }),
    }
}

#[derive(Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<TextSearchResult>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct TextSearchResult {
    place_id: Option<String>,
    name: Option<String>,
    formatted_address: Option<String>,
    rating: Option<f64>,
    user_ratings_total: Option<u64>,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl LatLng {
    fn coordinates(self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

impl TextSearchResult {
    fn into_raw(self) -> AppResult<RawPlaceResult> {
        let place_id = self
            .place_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::MalformedResponse("search result missing place_id".into()))?;
        let location = self
            .geometry
            .map(|g| g.location.coordinates())
            .ok_or_else(|| {
                AppError::MalformedResponse(format!("search result {place_id} missing geometry"))
            })?;
        Ok(RawPlaceResult {
            place_id,
            name: self.name,
            formatted_address: self.formatted_address,
            rating: self.rating,
            user_ratings_total: self.user_ratings_total,
            location,
        })
    }
}

#[derive(Deserialize)]
struct FindPlaceResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    candidates: Vec<FindPlaceCandidate>,
}

#[derive(Deserialize)]
struct FindPlaceCandidate {
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<DistanceMatrixRow>,
}

#[derive(Deserialize)]
struct DistanceMatrixRow {
    elements: Vec<DistanceMatrixElement>,
}

#[derive(Deserialize)]
struct DistanceMatrixElement {
    status: String,
    distance: Option<DistanceValue>,
}

#[derive(Deserialize)]
struct DistanceValue {
    value: u64,
}
