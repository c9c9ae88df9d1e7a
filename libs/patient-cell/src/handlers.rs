use axum::{
    extract::{Path, State},
    Json,
};

use shared_database::SharedStore;
use shared_models::{AppError, CreatePatientRequest, Patient};

use crate::services::PatientService;

#[axum::debug_handler]
pub async fn create_patient(
    State(store): State<SharedStore>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Patient>, AppError> {
    let service = PatientService::new(store);

    let patient = service.create_patient(request).await?;
    Ok(Json(patient))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<Patient>>, AppError> {
    let service = PatientService::new(store);

    Ok(Json(service.list_patients().await?))
}

#[axum::debug_handler]
pub async fn get_patient_by_phone(
    State(store): State<SharedStore>,
    Path(phone): Path<String>,
) -> Result<Json<Patient>, AppError> {
    let service = PatientService::new(store);

    Ok(Json(service.get_by_phone(&phone).await?))
}
