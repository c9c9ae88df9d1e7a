use axum::{
    extract::{Path, Query, State},
    Json,
};

use shared_database::SharedStore;
use shared_models::{AppError, AvailabilityWindow, CreateAvailabilityRequest, CreateDoctorRequest, Doctor};

use crate::models::{
    AvailabilityCheckResponse, AvailableDoctorsResponse, CheckAvailabilityQuery, SlotQuery,
};
use crate::services::{AvailabilityService, DoctorService};

// ==============================================================================
// DOCTOR DIRECTORY
// ==============================================================================

#[axum::debug_handler]
pub async fn create_doctor(
    State(store): State<SharedStore>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Doctor>, AppError> {
    let doctor_service = DoctorService::new(store);

    let doctor = doctor_service.create_doctor(request).await?;
    Ok(Json(doctor))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    let doctor_service = DoctorService::new(store);

    Ok(Json(doctor_service.list_doctors().await?))
}

#[axum::debug_handler]
pub async fn doctors_by_specialty(
    State(store): State<SharedStore>,
    Path(specialty): Path<String>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    let doctor_service = DoctorService::new(store);

    Ok(Json(doctor_service.find_by_specialty(&specialty).await?))
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[axum::debug_handler]
pub async fn available_doctors(
    State(store): State<SharedStore>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<AvailableDoctorsResponse>, AppError> {
    let availability_service = AvailabilityService::new(store);

    let available_doctors = availability_service
        .available_doctors(&query.date, &query.time)
        .await?;

    Ok(Json(AvailableDoctorsResponse { available_doctors }))
}

#[axum::debug_handler]
pub async fn check_availability(
    State(store): State<SharedStore>,
    Query(query): Query<CheckAvailabilityQuery>,
) -> Result<Json<AvailabilityCheckResponse>, AppError> {
    let availability_service = AvailabilityService::new(store);

    let outcome = availability_service
        .check(&query.doctor_name, &query.date, &query.time)
        .await?;

    Ok(Json(AvailabilityCheckResponse::from(&outcome)))
}

#[axum::debug_handler]
pub async fn create_availability(
    State(store): State<SharedStore>,
    Json(request): Json<CreateAvailabilityRequest>,
) -> Result<Json<AvailabilityWindow>, AppError> {
    let availability_service = AvailabilityService::new(store);

    Ok(Json(availability_service.create_window(request).await?))
}

#[axum::debug_handler]
pub async fn list_availability(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<AvailabilityWindow>>, AppError> {
    let availability_service = AvailabilityService::new(store);

    Ok(Json(availability_service.list_windows().await?))
}
