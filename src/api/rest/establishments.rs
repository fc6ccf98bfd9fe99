use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::establishment::{EstCourier, Establishment};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/establishments",
            post(create_establishment).get(list_establishments),
        )
        .route(
            "/establishments/:id",
            get(get_establishment).delete(delete_establishment),
        )
        .route("/establishments/:id/verified", patch(update_verified))
        .route(
            "/establishments/:id/couriers",
            post(add_staff_link).get(list_staff_links),
        )
}

#[derive(Deserialize)]
pub struct CreateEstablishmentRequest {
    pub name: String,
    pub photo_path: Option<String>,
    pub address: String,
    pub phone: String,
    pub business_id: String,
    pub work_schedule: String,
    pub legal_info: String,
    pub documentation_path: Option<String>,
}

#[derive(Deserialize)]
pub struct AddStaffRequest {
    pub courier_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateVerifiedRequest {
    pub verified: bool,
}

async fn create_establishment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateEstablishmentRequest>,
) -> Result<Json<Establishment>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    if payload.address.trim().is_empty() {
        return Err(AppError::BadRequest("address cannot be empty".to_string()));
    }

    let establishment = Establishment {
        id: Uuid::new_v4(),
        name: payload.name,
        photo_path: payload.photo_path,
        address: payload.address,
        phone: payload.phone,
        verified: false,
        business_id: payload.business_id,
        work_schedule: payload.work_schedule,
        legal_info: payload.legal_info,
        documentation_path: payload.documentation_path,
    };

    state
        .establishments
        .insert(establishment.id, establishment.clone());
    Ok(Json(establishment))
}

async fn list_establishments(State(state): State<Arc<AppState>>) -> Json<Vec<Establishment>> {
    let establishments = state
        .establishments
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(establishments)
}

async fn get_establishment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Establishment>, AppError> {
    let establishment = state
        .establishments
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("establishment {} not found", id)))?;

    Ok(Json(establishment.value().clone()))
}

async fn delete_establishment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.delete_establishment(id) {
        return Err(AppError::NotFound(format!(
            "establishment {} not found",
            id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn update_verified(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVerifiedRequest>,
) -> Result<Json<Establishment>, AppError> {
    let mut establishment = state
        .establishments
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("establishment {} not found", id)))?;

    establishment.verified = payload.verified;
    Ok(Json(establishment.clone()))
}

async fn add_staff_link(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddStaffRequest>,
) -> Result<Json<EstCourier>, AppError> {
    if state.establishments.get(&id).is_none() {
        return Err(AppError::NotFound(format!(
            "establishment {} not found",
            id
        )));
    }

    if let Some(courier_id) = payload.courier_id {
        if state.couriers.get(&courier_id).is_none() {
            return Err(AppError::NotFound(format!(
                "courier {} not found",
                courier_id
            )));
        }
    }

    let link = EstCourier {
        id: Uuid::new_v4(),
        establishment_id: id,
        courier_id: payload.courier_id,
    };

    state.est_couriers.insert(link.id, link.clone());
    Ok(Json(link))
}

async fn list_staff_links(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<EstCourier>>, AppError> {
    if state.establishments.get(&id).is_none() {
        return Err(AppError::NotFound(format!(
            "establishment {} not found",
            id
        )));
    }

    let links = state
        .est_couriers
        .iter()
        .filter(|entry| entry.value().establishment_id == id)
        .map(|entry| entry.value().clone())
        .collect();
    Ok(Json(links))
}
