mod api;
mod config;
mod engine;
mod error;
mod geo;
mod models;
mod observability;
mod state;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::geo::cache::GraphCache;
use crate::geo::geocode::NominatimGeocoder;
use crate::geo::overpass::OverpassGraphSource;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let geocoder = NominatimGeocoder::new(
        config.geocoder_url.clone(),
        Duration::from_secs(config.geocode_timeout_secs),
    )
    .map_err(|err| error::AppError::Internal(format!("failed to build geocoder client: {err}")))?;

    let source = OverpassGraphSource::new(
        config.overpass_url.clone(),
        Duration::from_secs(config.graph_fetch_timeout_secs),
    )
    .map_err(|err| {
        error::AppError::Internal(format!("failed to build street network client: {err}"))
    })?;

    let (app_state, route_rx) = state::AppState::new(
        Arc::new(geocoder),
        GraphCache::new(Arc::new(source)),
        config.area.clone(),
        config.route_queue_size,
        config.event_buffer_size,
    );
    let shared_state = Arc::new(app_state);

    let app = api::rest::router(shared_state.clone());

    tokio::spawn(engine::worker::run_route_worker(
        shared_state.clone(),
        route_rx,
    ));

    if config.graph_refresh_secs > 0 {
        let refresh_state = shared_state.clone();
        let period = Duration::from_secs(config.graph_refresh_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // interval fires immediately; skip the startup tick.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(err) = refresh_state.graph.refresh(&refresh_state.area).await {
                    tracing::warn!(error = %err, "scheduled graph refresh failed");
                }
            }
        });
    }

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| error::AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, area = %config.area, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| error::AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
