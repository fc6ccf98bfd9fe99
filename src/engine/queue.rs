use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Work item for the route worker. Only the id travels through the queue;
/// the worker reads the order's addresses at processing time.
#[derive(Debug, Clone, Copy)]
pub struct RouteJob {
    pub order_id: Uuid,
}

pub async fn enqueue_route_job(state: &AppState, job: RouteJob) -> Result<(), AppError> {
    state
        .route_tx
        .send(job)
        .await
        .map_err(|err| AppError::Internal(format!("route queue send failed: {err}")))?;

    state.metrics.route_jobs_in_queue.inc();
    Ok(())
}
