//! Model status and service health, as seen through the prediction service.

use std::sync::Arc;
use std::time::Duration;

use housing_common::{ModelStatus, ServiceHealth};

use super::{bounded, PredictionService};
use crate::error::Result;

/// Answers liveness and model-metadata questions on demand.
///
/// Nothing is cached: every call asks the prediction service again.
#[derive(Clone)]
pub struct ModelStatusMediator {
    service: Arc<dyn PredictionService>,
    timeout: Duration,
}

impl ModelStatusMediator {
    pub fn new(service: Arc<dyn PredictionService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// True only when the service reports status "ok" and a loaded model.
    ///
    /// Never fails: unreachable, rejecting or malformed answers all read as
    /// unhealthy.
    pub async fn check_health(&self) -> bool {
        match bounded(self.timeout, self.service.health()).await {
            Ok(health) => health.is_ready(),
            Err(e) => {
                tracing::error!("Prediction service health check failed: {}", e);
                false
            }
        }
    }

    pub async fn service_health(&self) -> ServiceHealth {
        ServiceHealth {
            healthy: self.check_health().await,
            service_url: self.service.service_url().to_string(),
        }
    }

    /// Unlike [`Self::check_health`], failures propagate to the caller.
    pub async fn model_info(&self) -> Result<ModelStatus> {
        let info = bounded(self.timeout, self.service.model_info()).await?;

        Ok(ModelStatus {
            loaded: info.loaded,
            feature_columns: info.feature_columns,
            valid_ocean_proximity: info.valid_ocean_proximity,
        })
    }
}
