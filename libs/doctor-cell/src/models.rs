use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use shared_models::{Doctor, DoctorSummary};

/// Input layout accepted for a requested slot, e.g. `2025-01-06 10:00`.
pub const SLOT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Why a doctor cannot take a requested slot. The `Display` text is returned
/// verbatim to clients and to the chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    DoctorNotFound,
    InvalidDateTime,
    AlreadyBooked,
    DayUnavailable,
    OutsideWorkingHours,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnavailableReason::DoctorNotFound => "Doctor not found",
            UnavailableReason::InvalidDateTime => "Invalid date or time format",
            UnavailableReason::AlreadyBooked => "Doctor already has an appointment at this time",
            UnavailableReason::DayUnavailable => "Doctor not available on this day",
            UnavailableReason::OutsideWorkingHours => "Time is outside doctor's working hours",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotAvailability {
    Available { doctor: Doctor },
    Unavailable { reason: UnavailableReason },
}

impl SlotAvailability {
    pub fn unavailable(reason: UnavailableReason) -> Self {
        SlotAvailability::Unavailable { reason }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SlotAvailability::Available { .. })
    }
}

/// Wire shape of an availability check: `{available, reason?, doctor?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityCheckResponse {
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorSummary>,
}

impl From<&SlotAvailability> for AvailabilityCheckResponse {
    fn from(outcome: &SlotAvailability) -> Self {
        match outcome {
            SlotAvailability::Available { doctor } => Self {
                available: true,
                reason: None,
                doctor: Some(DoctorSummary::from(doctor)),
            },
            SlotAvailability::Unavailable { reason } => Self {
                available: false,
                reason: Some(reason.to_string()),
                doctor: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableDoctorsResponse {
    pub available_doctors: Vec<DoctorSummary>,
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckAvailabilityQuery {
    pub doctor_name: String,
    pub date: String,
    pub time: String,
}

/// Parses a `YYYY-MM-DD` date and `HH:MM` time into one naive instant.
pub fn parse_slot(date: &str, time: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&format!("{} {}", date.trim(), time.trim()), SLOT_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_reason_texts() {
        assert_eq!(UnavailableReason::DoctorNotFound.to_string(), "Doctor not found");
        assert_eq!(UnavailableReason::InvalidDateTime.to_string(), "Invalid date or time format");
        assert_eq!(
            UnavailableReason::AlreadyBooked.to_string(),
            "Doctor already has an appointment at this time"
        );
        assert_eq!(UnavailableReason::DayUnavailable.to_string(), "Doctor not available on this day");
        assert_eq!(
            UnavailableReason::OutsideWorkingHours.to_string(),
            "Time is outside doctor's working hours"
        );
    }

    #[test]
    fn test_parse_slot() {
        let at = parse_slot("2025-01-06", "10:30").unwrap();
        assert_eq!(at.to_string(), "2025-01-06 10:30:00");

        assert!(parse_slot("2025-13-40", "10:00").is_none());
        assert!(parse_slot("2025-01-06", "ten").is_none());
        assert!(parse_slot("", "").is_none());
    }

    #[test]
    fn test_check_response_shape() {
        let unavailable = AvailabilityCheckResponse::from(&SlotAvailability::unavailable(
            UnavailableReason::DoctorNotFound,
        ));
        let json = serde_json::to_value(&unavailable).unwrap();
        assert_eq!(json, serde_json::json!({"available": false, "reason": "Doctor not found"}));

        let doctor = Doctor {
            id: 3,
            name: "Dr. Emily Davis".to_string(),
            specialty: "Dermatology".to_string(),
            department: "Dermatology".to_string(),
            created_at: Utc::now(),
        };
        let available = AvailabilityCheckResponse::from(&SlotAvailability::Available { doctor });
        let json = serde_json::to_value(&available).unwrap();
        assert_eq!(json["available"], true);
        assert_eq!(json["doctor"]["id"], 3);
        assert!(json.get("reason").is_none());
        assert!(json["doctor"].get("created_at").is_none());
    }
}
