use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use appointment_cell::{AppointmentBookingService, AppointmentError, BookingRequest};
use doctor_cell::{AvailabilityCheckResponse, AvailabilityService, DoctorService};
use shared_database::{SharedStore, StoreError};
use shared_models::AppError;

use crate::functions::FUNCTION_NAMES;

/// The closed set of operations the model may request.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum ClinicFunction {
    CheckDoctorAvailability {
        doctor_name: String,
        date: String,
        time: String,
    },
    FindDoctorsBySpecialty {
        specialty: String,
    },
    BookAppointment(BookingRequest),
    GetAvailableDoctors {
        date: String,
        time: String,
    },
}

impl ClinicFunction {
    pub fn parse(name: &str, arguments: Value) -> Result<Self, DispatchError> {
        if !FUNCTION_NAMES.contains(&name) {
            return Err(DispatchError::UnknownFunction(name.to_string()));
        }

        serde_json::from_value(json!({ "name": name, "arguments": arguments }))
            .map_err(|e| DispatchError::InvalidArguments(e.to_string()))
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Directory(#[from] AppError),

    #[error(transparent)]
    Booking(#[from] AppointmentError),

    #[error("Could not encode result: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Executes model-issued function calls against the clinic services and
/// renders plain JSON for the model to narrate.
pub struct ChatFunctionDispatcher {
    doctors: DoctorService,
    availability: AvailabilityService,
    booking: Arc<AppointmentBookingService>,
}

impl ChatFunctionDispatcher {
    pub fn new(store: SharedStore, booking: Arc<AppointmentBookingService>) -> Self {
        Self {
            doctors: DoctorService::new(store.clone()),
            availability: AvailabilityService::new(store),
            booking,
        }
    }

    /// Never fails: every error becomes `{"error": "<message>"}`.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Value {
        let result = match ClinicFunction::parse(name, arguments) {
            Ok(function) => self.execute(function).await,
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            warn!("Function {} failed: {}", name, e);
            json!({ "error": e.to_string() })
        })
    }

    pub async fn execute(&self, function: ClinicFunction) -> Result<Value, DispatchError> {
        debug!("Executing clinic function: {:?}", function);

        match function {
            ClinicFunction::CheckDoctorAvailability { doctor_name, date, time } => {
                let outcome = self.availability.check(&doctor_name, &date, &time).await?;
                Ok(serde_json::to_value(AvailabilityCheckResponse::from(&outcome))?)
            }
            ClinicFunction::FindDoctorsBySpecialty { specialty } => {
                let doctors = self.doctors.find_by_specialty(&specialty).await?;
                let doctors: Vec<Value> = doctors
                    .iter()
                    .map(|d| {
                        json!({
                            "name": d.name,
                            "specialty": d.specialty,
                            "department": d.department,
                        })
                    })
                    .collect();
                Ok(json!({ "doctors": doctors }))
            }
            ClinicFunction::BookAppointment(request) => {
                let outcome = self.booking.book(request).await?;
                Ok(serde_json::to_value(outcome)?)
            }
            ClinicFunction::GetAvailableDoctors { date, time } => {
                let available_doctors = self.availability.available_doctors(&date, &time).await?;
                Ok(json!({ "available_doctors": available_doctors }))
            }
        }
    }
}
