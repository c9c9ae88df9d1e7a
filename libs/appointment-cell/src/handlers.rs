// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use shared_models::{AppError, Appointment, CreateAppointmentRequest};

use crate::models::{BookingOutcome, BookingRequest};
use crate::services::AppointmentBookingService;

#[axum::debug_handler]
pub async fn create_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = service.create_appointment(request).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(service): State<Arc<AppointmentBookingService>>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    Ok(Json(service.list_appointments().await?))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    Ok(Json(service.appointments_for_doctor(doctor_id).await?))
}

/// Booking by names. A slot that cannot be taken is still a 200 with
/// `success: false`.
#[axum::debug_handler]
pub async fn book_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<BookingOutcome>, AppError> {
    Ok(Json(service.book(request).await?))
}
