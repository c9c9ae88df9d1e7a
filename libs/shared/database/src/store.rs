use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use shared_models::{
    Appointment, AppError, AvailabilityWindow, CreateAppointmentRequest,
    CreateAvailabilityRequest, CreateDoctorRequest, CreatePatientRequest, Doctor, Patient,
};

use crate::supabase::SupabaseError;

pub const UNIQUE_VIOLATION: &str = "23505";
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Malformed record: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<SupabaseError> for StoreError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Postgres { code, message, .. } if code == UNIQUE_VIOLATION => {
                StoreError::Conflict(message)
            }
            SupabaseError::Postgres { code, message, .. } if code == FOREIGN_KEY_VIOLATION => {
                StoreError::InvalidReference(message)
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::InvalidReference(msg) => AppError::BadRequest(msg),
            StoreError::Backend(msg) => AppError::Database(msg),
            StoreError::Decode(e) => AppError::Database(e.to_string()),
        }
    }
}

/// Persistence boundary for the four clinic relations.
///
/// Implementations must enforce two constraints on insert and report them as
/// [`StoreError::Conflict`]:
/// - a non-blank patient phone is unique;
/// - a doctor has at most one `scheduled` appointment per instant.
///
/// Listing and "first match" lookups are ordered by ascending id.
#[async_trait]
pub trait ClinicStore: Send + Sync {
    async fn insert_doctor(&self, request: CreateDoctorRequest) -> StoreResult<Doctor>;
    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>>;
    async fn get_doctor(&self, doctor_id: i64) -> StoreResult<Option<Doctor>>;
    /// First doctor whose name contains `fragment`, ignoring case.
    async fn find_doctor_by_name(&self, fragment: &str) -> StoreResult<Option<Doctor>>;
    async fn find_doctors_by_specialty(&self, fragment: &str) -> StoreResult<Vec<Doctor>>;

    async fn insert_patient(&self, request: CreatePatientRequest) -> StoreResult<Patient>;
    async fn list_patients(&self) -> StoreResult<Vec<Patient>>;
    async fn get_patient(&self, patient_id: i64) -> StoreResult<Option<Patient>>;
    async fn find_patient_by_phone(&self, phone: &str) -> StoreResult<Option<Patient>>;

    async fn insert_availability(&self, request: CreateAvailabilityRequest) -> StoreResult<AvailabilityWindow>;
    async fn list_availability(&self) -> StoreResult<Vec<AvailabilityWindow>>;
    /// First window flagged available for the doctor on that weekday.
    async fn find_open_window(&self, doctor_id: i64, day_of_week: i32) -> StoreResult<Option<AvailabilityWindow>>;

    /// Stores the appointment with status `scheduled`.
    async fn insert_appointment(&self, request: CreateAppointmentRequest) -> StoreResult<Appointment>;
    async fn list_appointments(&self) -> StoreResult<Vec<Appointment>>;
    async fn list_doctor_appointments(&self, doctor_id: i64) -> StoreResult<Vec<Appointment>>;
    async fn find_scheduled_appointment(
        &self,
        doctor_id: i64,
        at: NaiveDateTime,
    ) -> StoreResult<Option<Appointment>>;
}

pub type SharedStore = Arc<dyn ClinicStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_codes_map_to_store_errors() {
        let unique = SupabaseError::Postgres {
            status: 409,
            code: UNIQUE_VIOLATION.to_string(),
            message: "duplicate".to_string(),
        };
        assert!(matches!(StoreError::from(unique), StoreError::Conflict(_)));

        let fk = SupabaseError::Postgres {
            status: 409,
            code: FOREIGN_KEY_VIOLATION.to_string(),
            message: "missing doctor".to_string(),
        };
        assert!(matches!(StoreError::from(fk), StoreError::InvalidReference(_)));

        let other = SupabaseError::Api { status: 500, message: "boom".to_string() };
        assert!(matches!(StoreError::from(other), StoreError::Backend(_)));
    }

    #[test]
    fn test_store_errors_map_to_http() {
        let err: AppError = StoreError::Conflict("taken".to_string()).into();
        assert!(matches!(err, AppError::Conflict(_)));

        let err: AppError = StoreError::Backend("down".to_string()).into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
