//! Typed HTTP client for the housing API.

use std::time::Duration;

use async_trait::async_trait;
use housing_common::{
    ApiSuccess, ErrorBody, HousingFeatures, ModelStatus, PredictionResult, ServiceHealth,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};

/// Default API base, matching a locally running server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that can turn validated features into a prediction.
#[async_trait]
pub trait PredictionBackend: Send + Sync {
    async fn predict(&self, features: &HousingFeatures) -> Result<PredictionResult>;
}

/// Client for the `/housing` endpoints.
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Unexpected(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /housing/model-info
    pub async fn model_info(&self) -> Result<ModelStatus> {
        self.call(self.http_client.get(self.url("/housing/model-info")))
            .await
    }

    /// GET /housing/health
    pub async fn health(&self) -> Result<ServiceHealth> {
        self.call(self.http_client.get(self.url("/housing/health")))
            .await
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                ClientError::Unexpected(e.to_string())
            } else {
                tracing::debug!("Housing API unreachable: {}", e);
                ClientError::Network
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => ClientError::Api {
                    kind: body.kind,
                    status: status.as_u16(),
                    message: body.error,
                    details: body.details,
                },
                Err(_) => ClientError::Api {
                    kind: None,
                    status: status.as_u16(),
                    message: "An error occurred".to_string(),
                    details: Vec::new(),
                },
            });
        }

        let envelope: ApiSuccess<T> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Network
            } else {
                ClientError::Unexpected(e.to_string())
            }
        })?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl PredictionBackend for ApiClient {
    /// POST /housing/predict
    async fn predict(&self, features: &HousingFeatures) -> Result<PredictionResult> {
        let request = self
            .http_client
            .post(self.url("/housing/predict"))
            .json(features);
        self.call(request).await
    }
}
