pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use gateway::{
    HttpPredictionService, ModelStatusMediator, PredictionGateway, PredictionService,
    UpstreamHealth, UpstreamModelInfo, UpstreamTraining,
};
pub use state::AppState;
