use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use crate::engine::queue::RouteJob;
use crate::engine::resolver::{resolve_route, route_link, RouteError};
use crate::models::order::{RouteEvent, RouteResolution};
use crate::state::AppState;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

pub async fn run_route_worker(state: Arc<AppState>, mut route_rx: mpsc::Receiver<RouteJob>) {
    info!("route worker started");

    while let Some(job) = route_rx.recv().await {
        state.metrics.route_jobs_in_queue.dec();

        let start = Instant::now();
        match process_job(state.clone(), job).await {
            Ok(()) => {
                let elapsed = start.elapsed().as_secs_f64();
                state
                    .metrics
                    .route_resolution_latency_seconds
                    .with_label_values(&["success"])
                    .observe(elapsed);
                state
                    .metrics
                    .routes_total
                    .with_label_values(&["success"])
                    .inc();
            }
            Err(err) => {
                let elapsed = start.elapsed().as_secs_f64();
                state
                    .metrics
                    .route_resolution_latency_seconds
                    .with_label_values(&["error"])
                    .observe(elapsed);
                state
                    .metrics
                    .routes_total
                    .with_label_values(&["error"])
                    .inc();
                error!(order_id = %job.order_id, error = %err, "route resolution failed");
            }
        }

        state
            .metrics
            .street_graph_builds
            .set(state.graph.builds() as i64);
    }

    warn!("route worker stopped: queue channel closed");
}

async fn process_job(state: Arc<AppState>, job: RouteJob) -> Result<(), RouteError> {
    // Clone the addresses out; holding a map entry across the awaits below
    // would block the update at the end.
    let Some((origin, destination)) = state
        .orders
        .get(&job.order_id)
        .map(|order| (order.origin.clone(), order.destination.clone()))
    else {
        warn!(order_id = %job.order_id, "order vanished before resolution");
        return Ok(());
    };

    let mut attempt = 1;
    let outcome = loop {
        match resolve_route(
            state.geocoder.as_ref(),
            &state.graph,
            &state.area,
            &origin,
            &destination,
        )
        .await
        {
            Ok(summary) => break Ok(summary),
            Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                warn!(
                    order_id = %job.order_id,
                    attempt,
                    error = %err,
                    "transient resolution failure; retrying"
                );
                sleep(RETRY_DELAY).await;
                attempt += 1;
            }
            Err(err) => break Err(err),
        }
    };

    match outcome {
        Ok(summary) => {
            let link = route_link(&summary);
            let resolution = RouteResolution::Resolved(summary);

            if let Some(mut order) = state.orders.get_mut(&job.order_id) {
                order.route_link = link.clone();
                order.route = resolution.clone();
            }

            let _ = state.route_events_tx.send(RouteEvent {
                order_id: job.order_id,
                route_link: link,
                resolution,
            });

            info!(order_id = %job.order_id, "route resolved");
            Ok(())
        }
        Err(err) => {
            let resolution = RouteResolution::Failed {
                kind: err.kind(),
                message: err.to_string(),
            };

            if let Some(mut order) = state.orders.get_mut(&job.order_id) {
                order.route_link = None;
                order.route = resolution.clone();
            }

            let _ = state.route_events_tx.send(RouteEvent {
                order_id: job.order_id,
                route_link: None,
                resolution,
            });

            Err(err)
        }
    }
}
