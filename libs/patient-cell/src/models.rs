use thiserror::Error;

use shared_database::StoreError;
use shared_models::AppError;

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("Patient with phone {0} not found")]
    NotFound(String),

    #[error("Patient with phone {0} already exists")]
    PhoneAlreadyRegistered(String),

    #[error(transparent)]
    Validation(#[from] AppError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) => AppError::NotFound(err.to_string()),
            PatientError::PhoneAlreadyRegistered(_) => AppError::Conflict(err.to_string()),
            PatientError::Validation(inner) => inner,
            PatientError::Store(inner) => inner.into(),
        }
    }
}
