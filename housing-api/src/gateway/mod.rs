//! Outbound side of the API: the prediction service abstraction and the
//! components that mediate every call to it.
//!
//! Implementations of [`PredictionService`] classify failures into
//! [`crate::error::Error`]; [`PredictionGateway`] and [`ModelStatusMediator`]
//! bound each call in time and shape the results for callers.

mod client;
mod status;

pub use client::HttpPredictionService;
pub use status::ModelStatusMediator;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use housing_common::{timestamp_now, HousingFeatures, PredictionResult, TrainingReport};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Upstream answer to a health probe. Both fields are optional so that a
/// partial answer still decodes and is judged by [`UpstreamHealth::is_ready`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamHealth {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model_loaded: Option<bool>,
}

impl UpstreamHealth {
    /// Ready only when the service says so explicitly on both counts.
    pub fn is_ready(&self) -> bool {
        self.status.as_deref() == Some("ok") && self.model_loaded == Some(true)
    }
}

/// Upstream model metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamModelInfo {
    pub loaded: bool,
    pub feature_columns: Vec<String>,
    pub valid_ocean_proximity: Vec<String>,
}

/// Upstream answer to a retraining request.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamTraining {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub metrics: serde_json::Value,
}

/// The external prediction service.
///
/// Built once at startup and shared; tests substitute their own.
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Address of the service, for reporting.
    fn service_url(&self) -> &str;

    /// Probe liveness and whether a model is loaded.
    async fn health(&self) -> Result<UpstreamHealth>;

    /// Fetch model metadata.
    async fn model_info(&self) -> Result<UpstreamModelInfo>;

    /// Predict a price for one set of features.
    async fn predict(&self, features: &HousingFeatures) -> Result<f64>;

    /// Retrain the model.
    async fn train(&self) -> Result<UpstreamTraining>;
}

/// Run an outbound call with a hard upper bound; running out of time is
/// reported as the service being unavailable.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Prediction service call exceeded {:?}", limit);
            Err(Error::ServiceUnavailable)
        }
    }
}

/// Result of a retraining run, ready to be returned to a caller.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub message: String,
    pub report: TrainingReport,
}

/// Forwards validated features to the prediction service and shapes the answer.
///
/// Performs no validation of its own; callers hand it features that already
/// passed [`housing_common::validate`].
#[derive(Clone)]
pub struct PredictionGateway {
    service: Arc<dyn PredictionService>,
    timeout: Duration,
}

impl PredictionGateway {
    pub fn new(service: Arc<dyn PredictionService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Single attempt, no retry.
    pub async fn predict(&self, features: HousingFeatures) -> Result<PredictionResult> {
        let predicted_price = bounded(self.timeout, self.service.predict(&features)).await?;

        tracing::info!("Prediction made: {:.2}", predicted_price);

        Ok(PredictionResult {
            predicted_price,
            input: features,
            timestamp: timestamp_now(),
        })
    }

    /// Trigger retraining; the metrics are passed through as-is.
    pub async fn train(&self) -> Result<TrainingOutcome> {
        let training = bounded(self.timeout, self.service.train()).await?;

        Ok(TrainingOutcome {
            message: training
                .message
                .unwrap_or_else(|| "Model trained successfully".to_string()),
            report: TrainingReport {
                metrics: training.metrics,
                timestamp: timestamp_now(),
            },
        })
    }
}
