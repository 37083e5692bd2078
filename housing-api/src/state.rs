//! Shared application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::Result;
use crate::gateway::{HttpPredictionService, ModelStatusMediator, PredictionGateway, PredictionService};

/// Shared application state passed to all handlers.
///
/// Holds no per-request data; handlers may run concurrently without locking.
pub struct AppState {
    pub config: Config,
    pub gateway: PredictionGateway,
    pub model_status: ModelStatusMediator,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the gateway and mediator to one shared prediction service.
    pub fn new(config: Config, service: Arc<dyn PredictionService>) -> Self {
        let timeout = Duration::from_secs(config.upstream.timeout_secs);
        Self {
            gateway: PredictionGateway::new(service.clone(), timeout),
            model_status: ModelStatusMediator::new(service, timeout),
            config,
            started_at: Instant::now(),
        }
    }

    /// Build state backed by the HTTP prediction service named in `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let service = HttpPredictionService::new(
            &config.upstream.base_url,
            Duration::from_secs(config.upstream.timeout_secs),
        )?;
        Ok(Self::new(config, Arc::new(service)))
    }
}
