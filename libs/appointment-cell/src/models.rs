use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use doctor_cell::UnavailableReason;
use patient_cell::PatientError;
use shared_database::StoreError;
use shared_models::AppError;

/// Booking by names, as issued by the chat model or `POST /appointments/book`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    pub doctor_name: String,
    pub patient_name: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub patient_phone: String,
    pub appointment_date: String,
    pub appointment_time: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub notes: String,
}

fn empty_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{success, message, appointment_id?, doctor?, patient?, date?, time?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl BookingOutcome {
    pub const CONFIRMED: &'static str = "Appointment booked successfully";

    pub fn rejected(reason: UnavailableReason) -> Self {
        Self {
            success: false,
            message: reason.to_string(),
            appointment_id: None,
            doctor: None,
            patient: None,
            date: None,
            time: None,
        }
    }

    pub fn confirmed(appointment_id: i64, doctor: &str, patient: &str, date: &str, time: &str) -> Self {
        Self {
            success: true,
            message: Self::CONFIRMED.to_string(),
            appointment_id: Some(appointment_id),
            doctor: Some(doctor.to_string()),
            patient: Some(patient.to_string()),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Doctor {0} not found")]
    DoctorNotFound(i64),

    #[error("Patient {0} not found")]
    PatientNotFound(i64),

    #[error("Doctor {doctor_id} already has an appointment at {at}")]
    SlotTaken { doctor_id: i64, at: NaiveDateTime },

    #[error(transparent)]
    Validation(#[from] AppError),

    #[error(transparent)]
    Patient(#[from] PatientError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::DoctorNotFound(_) | AppointmentError::PatientNotFound(_) => {
                AppError::BadRequest(err.to_string())
            }
            AppointmentError::SlotTaken { .. } => AppError::Conflict(err.to_string()),
            AppointmentError::Validation(inner) => inner,
            AppointmentError::Patient(inner) => inner.into(),
            AppointmentError::Store(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejected_outcome_only_carries_message() {
        let outcome = BookingOutcome::rejected(UnavailableReason::DayUnavailable);

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": false, "message": "Doctor not available on this day"})
        );
    }

    #[test]
    fn test_booking_request_optional_fields_default_to_empty() {
        let request: BookingRequest = serde_json::from_value(json!({
            "doctor_name": "Chen",
            "patient_name": "Jane Doe",
            "appointment_date": "2025-01-06",
            "appointment_time": "10:00"
        }))
        .unwrap();

        assert_eq!(request.patient_phone, "");
        assert_eq!(request.notes, "");

        let request: BookingRequest = serde_json::from_value(json!({
            "doctor_name": "Chen",
            "patient_name": "Jane Doe",
            "patient_phone": null,
            "appointment_date": "2025-01-06",
            "appointment_time": "10:00",
            "notes": null
        }))
        .unwrap();

        assert_eq!(request.patient_phone, "");
        assert_eq!(request.notes, "");
    }

    #[test]
    fn test_error_status_mapping() {
        let at = chrono::NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        assert!(matches!(AppError::from(AppointmentError::SlotTaken { doctor_id: 1, at }), AppError::Conflict(_)));
        assert!(matches!(AppError::from(AppointmentError::DoctorNotFound(9)), AppError::BadRequest(_)));
    }
}
