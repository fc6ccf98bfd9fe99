use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::Json;
use axum::Router;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::workforce::{Penalty, Salary, Schedule};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/penalties", post(create_penalty))
        .route("/penalties/:id", delete(delete_penalty))
        .route("/couriers/:id/penalties", get(list_courier_penalties))
        .route("/schedules", post(create_schedule))
        .route("/schedules/:id", delete(delete_schedule))
        .route("/couriers/:id/schedules", get(list_courier_schedules))
        .route("/salaries", post(create_salary))
        .route("/salaries/:id", delete(delete_salary))
        .route("/couriers/:id/salary", get(list_courier_salary))
}

#[derive(Deserialize)]
pub struct CreatePenaltyRequest {
    pub courier_id: Uuid,
    pub penalty_type: String,
    pub amount: Decimal,
    pub reason: String,
}

#[derive(Deserialize)]
pub struct CreateScheduleRequest {
    pub courier_id: Uuid,
    pub establishment_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub skip: bool,
}

#[derive(Deserialize)]
pub struct CreateSalaryRequest {
    pub courier_id: Uuid,
    pub working_hours: u32,
    pub rate_per_hour: u32,
}

/// Salary record plus the derived total.
#[derive(Serialize)]
pub struct SalaryResponse {
    #[serde(flatten)]
    pub salary: Salary,
    pub total_pay: u64,
}

fn ensure_courier(state: &AppState, id: Uuid) -> Result<(), AppError> {
    if state.couriers.get(&id).is_none() {
        return Err(AppError::NotFound(format!("courier {} not found", id)));
    }
    Ok(())
}

async fn create_penalty(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePenaltyRequest>,
) -> Result<Json<Penalty>, AppError> {
    ensure_courier(&state, payload.courier_id)?;

    if payload.amount.is_sign_negative() {
        return Err(AppError::BadRequest(
            "amount cannot be negative".to_string(),
        ));
    }

    let penalty = Penalty {
        id: Uuid::new_v4(),
        courier_id: payload.courier_id,
        penalty_type: payload.penalty_type,
        amount: payload.amount.round_dp(2),
        reason: payload.reason,
    };

    state.penalties.insert(penalty.id, penalty.clone());
    Ok(Json(penalty))
}

async fn list_courier_penalties(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Penalty>>, AppError> {
    ensure_courier(&state, id)?;

    let penalties = state
        .penalties
        .iter()
        .filter(|entry| entry.value().courier_id == id)
        .map(|entry| entry.value().clone())
        .collect();
    Ok(Json(penalties))
}

async fn delete_penalty(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.penalties.remove(&id).is_none() {
        return Err(AppError::NotFound(format!("penalty {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn create_schedule(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateScheduleRequest>,
) -> Result<Json<Schedule>, AppError> {
    ensure_courier(&state, payload.courier_id)?;

    if state.establishments.get(&payload.establishment_id).is_none() {
        return Err(AppError::NotFound(format!(
            "establishment {} not found",
            payload.establishment_id
        )));
    }

    if payload.end_time <= payload.start_time {
        return Err(AppError::BadRequest(
            "end_time must be after start_time".to_string(),
        ));
    }

    let schedule = Schedule {
        id: Uuid::new_v4(),
        courier_id: payload.courier_id,
        establishment_id: payload.establishment_id,
        date: payload.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        skip: payload.skip,
    };

    state.schedules.insert(schedule.id, schedule.clone());
    Ok(Json(schedule))
}

async fn list_courier_schedules(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    ensure_courier(&state, id)?;

    let schedules = state
        .schedules
        .iter()
        .filter(|entry| entry.value().courier_id == id)
        .map(|entry| entry.value().clone())
        .collect();
    Ok(Json(schedules))
}

async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.schedules.remove(&id).is_none() {
        return Err(AppError::NotFound(format!("schedule {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn create_salary(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSalaryRequest>,
) -> Result<Json<SalaryResponse>, AppError> {
    ensure_courier(&state, payload.courier_id)?;

    let salary = Salary {
        id: Uuid::new_v4(),
        courier_id: payload.courier_id,
        working_hours: payload.working_hours,
        rate_per_hour: payload.rate_per_hour,
    };

    state.salaries.insert(salary.id, salary.clone());

    let total_pay = salary.total_pay();
    Ok(Json(SalaryResponse { salary, total_pay }))
}

async fn list_courier_salary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SalaryResponse>>, AppError> {
    ensure_courier(&state, id)?;

    let salaries = state
        .salaries
        .iter()
        .filter(|entry| entry.value().courier_id == id)
        .map(|entry| {
            let salary = entry.value().clone();
            let total_pay = salary.total_pay();
            SalaryResponse { salary, total_pay }
        })
        .collect();
    Ok(Json(salaries))
}

async fn delete_salary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.salaries.remove(&id).is_none() {
        return Err(AppError::NotFound(format!("salary {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
