use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use housing_common::timestamp_now;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    /// Seconds since the process started serving.
    uptime: f64,
}

/// GET /health - process liveness. Does not touch the prediction service.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: timestamp_now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
