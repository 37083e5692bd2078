use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api - endpoint listing.
async fn index() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the housing price API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "housing": {
                "predict": "POST /api/housing/predict",
                "modelInfo": "GET /api/housing/model-info",
                "health": "GET /api/housing/health",
                "train": "POST /api/housing/train"
            }
        }
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}
