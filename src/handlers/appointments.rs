use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::Appointment;
use crate::services::booking;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct BookingParams {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
}

#[derive(Serialize)]
pub struct BookingResponse {
    pub message: String,
    pub appointment: Appointment,
}

// POST /book_appointment?name=&email=&phone=&date=
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BookingParams>,
) -> Result<Json<BookingResponse>, AppError> {
    let appointment = booking::submit_booking(
        state.store.as_ref(),
        &params.name,
        &params.email,
        &params.phone,
        &params.date,
    )?;

    Ok(Json(BookingResponse {
        message: "Appointment booked successfully".to_string(),
        appointment,
    }))
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

// GET /appointments
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AppointmentsResponse>, AppError> {
    let appointments = state.store.list().map_err(|e| {
        tracing::error!(error = %e, "failed to list appointments");
        AppError::Persistence(e.to_string())
    })?;
    Ok(Json(AppointmentsResponse { appointments }))
}
