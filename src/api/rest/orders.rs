use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::queue::{enqueue_route_job, RouteJob};
use crate::error::AppError;
use crate::geo::GeoPoint;
use crate::models::order::{Order, OrderStatus, RouteResolution};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", get(get_order).delete(delete_order))
        .route("/orders/:id/status", patch(update_order_status))
        .route("/orders/:id/courier", patch(update_order_courier))
        .route("/orders/:id/location", patch(update_courier_position))
        .route("/orders/:id/resolve", post(resolve_order_route))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub sender: Uuid,
    pub recipient: String,
    pub origin: String,
    pub destination: String,
    pub courier: Option<Uuid>,
    pub comment: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct UpdateCourierRequest {
    pub courier: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdatePositionRequest {
    pub position: GeoPoint,
}

/// Stores the order immediately with a pending route and hands resolution
/// to the background worker. Creation never blocks on the geocoder or the
/// street-network source.
async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.recipient.trim().is_empty() {
        return Err(AppError::BadRequest("recipient cannot be empty".to_string()));
    }

    if payload.origin.trim().is_empty() {
        return Err(AppError::BadRequest("origin cannot be empty".to_string()));
    }

    if payload.destination.trim().is_empty() {
        return Err(AppError::BadRequest(
            "destination cannot be empty".to_string(),
        ));
    }

    if state.establishments.get(&payload.sender).is_none() {
        return Err(AppError::NotFound(format!(
            "establishment {} not found",
            payload.sender
        )));
    }

    if let Some(courier_id) = payload.courier {
        if state.couriers.get(&courier_id).is_none() {
            return Err(AppError::NotFound(format!(
                "courier {} not found",
                courier_id
            )));
        }
    }

    let order = Order {
        id: Uuid::new_v4(),
        sender: payload.sender,
        recipient: payload.recipient,
        status: OrderStatus::Processed,
        origin: payload.origin,
        destination: payload.destination,
        route_link: None,
        route: RouteResolution::Pending,
        courier: payload.courier,
        courier_position: None,
        created_at: Utc::now(),
        comment: payload.comment,
    };

    state.orders.insert(order.id, order.clone());
    enqueue_route_job(&state, RouteJob { order_id: order.id }).await?;

    Ok(Json(order))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    let orders = state
        .orders
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(orders)
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .orders
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    Ok(Json(order.value().clone()))
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let mut order = state
        .orders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    order.status = payload.status;
    Ok(Json(order.clone()))
}

async fn update_order_courier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCourierRequest>,
) -> Result<Json<Order>, AppError> {
    if let Some(courier_id) = payload.courier {
        if state.couriers.get(&courier_id).is_none() {
            return Err(AppError::NotFound(format!(
                "courier {} not found",
                courier_id
            )));
        }
    }

    let mut order = state
        .orders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    order.courier = payload.courier;
    Ok(Json(order.clone()))
}

async fn update_courier_position(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePositionRequest>,
) -> Result<Json<Order>, AppError> {
    let mut order = state
        .orders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    order.courier_position = Some(payload.position);
    Ok(Json(order.clone()))
}

/// Explicit re-resolution. Field updates never retrigger routing; this is
/// the only way to recompute after the addresses were entered wrong or the
/// graph changed.
async fn resolve_order_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = {
        let mut order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

        order.route = RouteResolution::Pending;
        order.route_link = None;
        order.clone()
    };

    enqueue_route_job(&state, RouteJob { order_id: id }).await?;
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.orders.remove(&id).is_none() {
        return Err(AppError::NotFound(format!("order {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
