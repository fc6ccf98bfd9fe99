use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::courier::Courier;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/couriers", post(create_courier).get(list_couriers))
        .route("/couriers/:id", get(get_courier).delete(delete_courier))
        .route("/couriers/:id/active", patch(update_courier_active))
}

#[derive(Deserialize)]
pub struct CreateCourierRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub photo_path: Option<String>,
    pub username: String,
    pub password: String,
    pub user_account: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateActiveRequest {
    pub active: bool,
}

async fn create_courier(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCourierRequest>,
) -> Result<Json<Courier>, AppError> {
    if payload.full_name.trim().is_empty() {
        return Err(AppError::BadRequest("full_name cannot be empty".to_string()));
    }

    if payload.username.trim().is_empty() {
        return Err(AppError::BadRequest("username cannot be empty".to_string()));
    }

    if !payload.email.contains('@') {
        return Err(AppError::BadRequest("email is not valid".to_string()));
    }

    if state.username_taken(&payload.username) {
        return Err(AppError::Conflict(format!(
            "username \"{}\" is already taken",
            payload.username
        )));
    }

    let courier = Courier {
        id: Uuid::new_v4(),
        full_name: payload.full_name,
        email: payload.email,
        phone: payload.phone,
        photo_path: payload.photo_path,
        username: payload.username,
        password: payload.password,
        user_account: payload.user_account,
        active: true,
    };

    state.couriers.insert(courier.id, courier.clone());
    Ok(Json(courier))
}

async fn list_couriers(State(state): State<Arc<AppState>>) -> Json<Vec<Courier>> {
    let couriers = state
        .couriers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(couriers)
}

async fn get_courier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Courier>, AppError> {
    let courier = state
        .couriers
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("courier {} not found", id)))?;

    Ok(Json(courier.value().clone()))
}

async fn update_courier_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateActiveRequest>,
) -> Result<Json<Courier>, AppError> {
    let mut courier = state
        .couriers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("courier {} not found", id)))?;

    courier.active = payload.active;
    Ok(Json(courier.clone()))
}

async fn delete_courier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.delete_courier(id) {
        return Err(AppError::NotFound(format!("courier {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
