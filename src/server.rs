use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::{info, warn};

use crate::collector::Collector;
use crate::config::{AppConfig, CollectionTrigger};
use crate::errors::{AppError, AppResult};
use crate::payload::assemble_with_state;

pub struct AppState {
    pub config: AppConfig,
    pub collector: Collector,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(collect_places))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

/// Runs one collection for the trigger in the request body.
pub async fn collect_places(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let trigger = match parse_trigger(&body) {
        Ok(trigger) => trigger,
        Err(err) => {
            warn!(%err, "rejected malformed trigger");
            return error_response(StatusCode::BAD_REQUEST, &err);
        }
    };

    match run(&state, trigger).await {
        Ok(payload) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], payload).into_response()
        }
        Err(err) => {
            warn!(%err, "collection failed");
            let status = if err.is_provider_failure() {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            error_response(status, &err)
        }
    }
}

fn parse_trigger(body: &[u8]) -> AppResult<CollectionTrigger> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CollectionTrigger::default());
    }
    Ok(serde_json::from_slice(body)?)
}

async fn run(state: &AppState, trigger: CollectionTrigger) -> AppResult<String> {
    let plan = trigger.plan(&state.config)?;
    info!(
        categories = plan.categories.len(),
        districts = plan.districts.len(),
        "collection started"
    );
    let records = state.collector.collect(&plan).await?;
    assemble_with_state(records, trigger.state.unwrap_or_default()).to_json()
}

fn error_response(status: StatusCode, err: &AppError) -> Response {
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
