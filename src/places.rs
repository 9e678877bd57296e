use serde::Serialize;

use crate::identity::record_id;

/// One unit of collection work: a category searched near a district.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceQuery {
    pub category: String,
    pub district: String,
}

impl PlaceQuery {
    pub fn new(category: impl Into<String>, district: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            district: district.into(),
        }
    }

    pub fn text_query(&self) -> String {
        format!("{} near {}", self.category, self.district)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `lat,lng` as the distance matrix expects it.
    pub fn to_param(self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawPlaceResult {
    pub place_id: String,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u64>,
    pub location: Coordinates,
}

/// A single text search page and the token for the next one, if any.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub results: Vec<RawPlaceResult>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceRecord {
    pub id: String,
    pub gmaps_place_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u64>,
    pub location_lat: f64,
    pub location_lng: f64,
    pub query_place_type: String,
    pub query_district_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_from_center: Option<u64>,
}

impl PlaceRecord {
    pub fn from_raw(raw: RawPlaceResult, query: &PlaceQuery) -> Self {
        Self {
            id: record_id(&raw.place_id, &query.category, &query.district),
            gmaps_place_id: raw.place_id,
            name: raw.name,
            formatted_address: raw.formatted_address,
            rating: raw.rating,
            user_ratings_total: raw.user_ratings_total,
            location_lat: raw.location.lat,
            location_lng: raw.location.lng,
            query_place_type: query.category.clone(),
            query_district_name: query.district.clone(),
            distance_from_center: None,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.location_lat, self.location_lng)
    }
}
