//! Housing API - validates housing features and proxies them to the prediction service.

use std::sync::Arc;

use tokio::net::TcpListener;

use housing_api::{logging, routes, AppState, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Check config.toml or the HOUSING__SECTION__KEY environment variables.",
            e
        )
    })?;

    logging::init(&config.logging.level);

    tracing::info!(
        "Starting housing API, prediction service at {} (timeout {}s)",
        config.upstream.base_url,
        config.upstream.timeout_secs
    );

    // One outbound client for the life of the process
    let state = Arc::new(AppState::from_config(config.clone())?);
    let app = routes::router(state);

    let addr = config.bind_addr();
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
