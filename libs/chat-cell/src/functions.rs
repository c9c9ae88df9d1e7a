use serde_json::json;

use crate::models::FunctionDefinition;

pub const CHECK_DOCTOR_AVAILABILITY: &str = "check_doctor_availability";
pub const FIND_DOCTORS_BY_SPECIALTY: &str = "find_doctors_by_specialty";
pub const BOOK_APPOINTMENT: &str = "book_appointment";
pub const GET_AVAILABLE_DOCTORS: &str = "get_available_doctors";

pub const FUNCTION_NAMES: [&str; 4] = [
    CHECK_DOCTOR_AVAILABILITY,
    FIND_DOCTORS_BY_SPECIALTY,
    BOOK_APPOINTMENT,
    GET_AVAILABLE_DOCTORS,
];

/// Functions advertised to the model on every turn.
pub fn clinic_functions() -> Vec<FunctionDefinition> {
    vec![
        FunctionDefinition {
            name: CHECK_DOCTOR_AVAILABILITY.to_string(),
            description: "Check if a specific doctor is available on a given date and time".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "doctor_name": {"type": "string", "description": "Name of the doctor to check availability for"},
                    "date": {"type": "string", "description": "Date in YYYY-MM-DD format"},
                    "time": {"type": "string", "description": "Time in HH:MM format"}
                },
                "required": ["doctor_name", "date", "time"]
            }),
        },
        FunctionDefinition {
            name: FIND_DOCTORS_BY_SPECIALTY.to_string(),
            description: "Find doctors by their medical specialty".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "specialty": {
                        "type": "string",
                        "description": "Medical specialty (e.g., dermatology, orthopedics, cardiology)"
                    }
                },
                "required": ["specialty"]
            }),
        },
        FunctionDefinition {
            name: BOOK_APPOINTMENT.to_string(),
            description: "Book an appointment with a doctor".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "doctor_name": {"type": "string", "description": "Name of the doctor"},
                    "patient_name": {"type": "string", "description": "Name of the patient"},
                    "patient_phone": {"type": "string", "description": "Phone number of the patient"},
                    "appointment_date": {"type": "string", "description": "Date in YYYY-MM-DD format"},
                    "appointment_time": {"type": "string", "description": "Time in HH:MM format"},
                    "notes": {"type": "string", "description": "Additional notes about the appointment"}
                },
                "required": ["doctor_name", "patient_name", "appointment_date", "appointment_time"]
            }),
        },
        FunctionDefinition {
            name: GET_AVAILABLE_DOCTORS.to_string(),
            description: "Get list of all available doctors for a specific date and time".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "date": {"type": "string", "description": "Date in YYYY-MM-DD format"},
                    "time": {"type": "string", "description": "Time in HH:MM format"}
                },
                "required": ["date", "time"]
            }),
        },
    ]
}
