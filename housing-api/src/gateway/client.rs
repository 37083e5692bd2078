//! HTTP client for the external prediction service.

use std::time::Duration;

use async_trait::async_trait;
use housing_common::HousingFeatures;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{PredictionService, UpstreamHealth, UpstreamModelInfo, UpstreamTraining};
use crate::error::{Error, Result};

/// Prediction service reached over HTTP.
///
/// Every failure mode of an outbound call is classified here:
/// - an error status becomes [`Error::UpstreamRejected`], carrying the
///   upstream message when it sent one;
/// - a request that got no answer (refused, reset, timed out) becomes
///   [`Error::ServiceUnavailable`];
/// - a request that could not be built, or an answer that could not be
///   decoded, becomes [`Error::Internal`].
pub struct HttpPredictionService {
    http_client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    prediction: f64,
}

/// Error body shape used by the prediction service.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpPredictionService {
    /// Build the client. `timeout` bounds each whole request.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        default_message: &str,
    ) -> Result<T> {
        let response = request.send().await.map_err(classify_transport)?;

        if !response.status().is_success() {
            return Err(rejection(response, default_message).await);
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                Error::ServiceUnavailable
            } else {
                Error::Internal(format!("invalid response from prediction service: {}", e))
            }
        })
    }
}

/// Classify a failure that happened before any response arrived.
fn classify_transport(err: reqwest::Error) -> Error {
    if err.is_builder() {
        tracing::error!("Could not build prediction service request: {}", err);
        Error::Internal(err.to_string())
    } else {
        tracing::warn!("No response from prediction service: {}", err);
        Error::ServiceUnavailable
    }
}

/// Turn an error status into [`Error::UpstreamRejected`].
async fn rejection(response: Response, default_message: &str) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorResponse = serde_json::from_str(&body).unwrap_or_default();

    let message = [parsed.error, parsed.message]
        .into_iter()
        .flatten()
        .find(|m| !m.is_empty())
        .unwrap_or_else(|| default_message.to_string());

    tracing::warn!(status, "Prediction service rejected request: {}", message);

    Error::UpstreamRejected { status, message }
}

#[async_trait]
impl PredictionService for HttpPredictionService {
    fn service_url(&self) -> &str {
        &self.base_url
    }

    async fn health(&self) -> Result<UpstreamHealth> {
        let request = self.http_client.get(self.url("/health"));
        self.call(request, "Health check failed").await
    }

    async fn model_info(&self) -> Result<UpstreamModelInfo> {
        let request = self.http_client.get(self.url("/model-info"));
        self.call(request, "Failed to get model info").await
    }

    async fn predict(&self, features: &HousingFeatures) -> Result<f64> {
        tracing::debug!("Sending prediction request to {}", self.base_url);

        let request = self.http_client.post(self.url("/predict")).json(features);
        let response: PredictResponse = self.call(request, "Prediction failed").await?;
        Ok(response.prediction)
    }

    async fn train(&self) -> Result<UpstreamTraining> {
        tracing::info!("Requesting model retraining from {}", self.base_url);

        let request = self.http_client.post(self.url("/train"));
        self.call(request, "Model training failed").await
    }
}
