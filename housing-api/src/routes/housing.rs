//! Housing price endpoints, mounted under `/api/housing`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use housing_common::{ApiSuccess, ModelStatus, PredictionResult, ServiceHealth, TrainingReport};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::state::AppState;

/// Build the housing router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/predict", post(predict))
        .route("/model-info", get(model_info))
        .route("/health", get(health))
        .route("/train", post(train))
}

/// POST /api/housing/predict - validate the features, then ask for a price.
///
/// Invalid input never reaches the prediction service.
async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiSuccess<PredictionResult>>> {
    let Json(payload) = payload.map_err(|e| Error::malformed_body(e.body_text()))?;

    let features = housing_common::validate(&payload).map_err(|errors| {
        tracing::debug!("Rejected prediction input: {}", errors);
        Error::from(errors)
    })?;

    let result = state.gateway.predict(features).await?;

    Ok(Json(
        ApiSuccess::new(result).with_message("Prediction completed successfully"),
    ))
}

/// GET /api/housing/model-info
async fn model_info(State(state): State<Arc<AppState>>) -> Result<Json<ApiSuccess<ModelStatus>>> {
    let status = state.model_status.model_info().await?;
    Ok(Json(ApiSuccess::new(status)))
}

/// GET /api/housing/health - always 200; the payload says whether the
/// prediction service is usable.
async fn health(State(state): State<Arc<AppState>>) -> Json<ApiSuccess<ServiceHealth>> {
    Json(ApiSuccess::new(state.model_status.service_health().await))
}

/// POST /api/housing/train - fire a retraining run and relay its metrics.
async fn train(State(state): State<Arc<AppState>>) -> Result<Json<ApiSuccess<TrainingReport>>> {
    let outcome = state.gateway.train().await?;
    Ok(Json(ApiSuccess::new(outcome.report).with_message(outcome.message)))
}
