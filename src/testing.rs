//! Scripted stand-ins for the maps provider and the page-token pause.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::{AppError, AppResult};
use crate::google::MapsProvider;
use crate::places::{Coordinates, RawPlaceResult, SearchPage};
use crate::search::Throttle;

/// Search pages are served in push order; an exhausted queue yields empty pages.
/// Distance batches without a scripted answer echo each destination's latitude.
#[derive(Default)]
pub struct FakeMaps {
    pages: Mutex<VecDeque<AppResult<SearchPage>>>,
    centers: Mutex<HashMap<String, Coordinates>>,
    distances: Mutex<VecDeque<AppResult<Vec<u64>>>>,
    search_calls: Mutex<Vec<(String, Option<String>)>>,
    center_calls: Mutex<Vec<String>>,
    distance_calls: Mutex<Vec<(Coordinates, Vec<Coordinates>)>>,
}

impl FakeMaps {
    pub fn push_page(&self, page: SearchPage) {
        self.pages.lock().push_back(Ok(page));
    }

    pub fn push_search_error(&self, err: AppError) {
        self.pages.lock().push_back(Err(err));
    }

    pub fn set_center(&self, district: &str, center: Coordinates) {
        self.centers.lock().insert(district.to_string(), center);
    }

    pub fn push_distances(&self, distances: Vec<u64>) {
        self.distances.lock().push_back(Ok(distances));
    }

    pub fn push_distance_error(&self, err: AppError) {
        self.distances.lock().push_back(Err(err));
    }

    pub fn search_calls(&self) -> Vec<(String, Option<String>)> {
        self.search_calls.lock().clone()
    }

    pub fn center_calls(&self) -> Vec<String> {
        self.center_calls.lock().clone()
    }

    pub fn distance_calls(&self) -> Vec<(Coordinates, Vec<Coordinates>)> {
        self.distance_calls.lock().clone()
    }
}

#[async_trait]
impl MapsProvider for FakeMaps {
    async fn search_places(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> AppResult<SearchPage> {
        self.search_calls
            .lock()
            .push((query.to_string(), page_token.map(str::to_string)));
        self.pages
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchPage::default()))
    }

    async fn resolve_center(&self, district: &str) -> AppResult<Option<Coordinates>> {
        self.center_calls.lock().push(district.to_string());
        Ok(self.centers.lock().get(district).copied())
    }

    async fn compute_distances(
        &self,
        origin: Coordinates,
        destinations: &[Coordinates],
    ) -> AppResult<Vec<u64>> {
        self.distance_calls
            .lock()
            .push((origin, destinations.to_vec()));
        self.distances.lock().pop_front().unwrap_or_else(|| {
            Ok(destinations
                .iter()
                .map(|d| d.lat.round() as u64)
                .collect())
        })
    }
}

#[derive(Default)]
pub struct RecordingThrottle {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingThrottle {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().clone()
    }
}

#[async_trait]
impl Throttle for RecordingThrottle {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().push(duration);
    }
}

/// `count` results named `{prefix}-{i}`, the i-th located at latitude `i`.
pub fn page(prefix: &str, count: usize, next_page_token: Option<&str>) -> SearchPage {
    SearchPage {
        results: (0..count)
            .map(|i| RawPlaceResult {
                place_id: format!("{prefix}-{i}"),
                name: Some(format!("{prefix} place {i}")),
                formatted_address: None,
                rating: None,
                user_ratings_total: None,
                location: Coordinates::new(i as f64, 0.0),
            })
            .collect(),
        next_page_token: next_page_token.map(str::to_string),
    }
}
