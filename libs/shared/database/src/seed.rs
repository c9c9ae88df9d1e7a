use chrono::NaiveTime;
use tracing::info;

use shared_models::{CreateAvailabilityRequest, CreateDoctorRequest, CreatePatientRequest};

use crate::store::{ClinicStore, StoreResult};

pub const SEED_DOCTORS: [(&str, &str, &str); 5] = [
    ("Dr. Sarah Johnson", "Cardiology", "Internal Medicine"),
    ("Dr. Michael Chen", "Orthopedics", "Surgery"),
    ("Dr. Emily Davis", "Dermatology", "Dermatology"),
    ("Dr. Robert Wilson", "Orthopedics", "Surgery"),
    ("Dr. Lisa Brown", "General Medicine", "Internal Medicine"),
];

pub const SEED_PATIENTS: [(&str, &str, &str); 2] = [
    ("John Smith", "+1234567890", "john.smith@email.com"),
    ("Jane Doe", "+1234567891", "jane.doe@email.com"),
];

/// Fills `store` with the demo clinic: five doctors, each open Monday to
/// Friday from 09:00 to 17:00, and two patients.
pub async fn seed_clinic(store: &dyn ClinicStore) -> StoreResult<()> {
    let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);
    let end = NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN);

    for (name, specialty, department) in SEED_DOCTORS {
        let doctor = store
            .insert_doctor(CreateDoctorRequest {
                name: name.to_string(),
                specialty: specialty.to_string(),
                department: department.to_string(),
            })
            .await?;

        for day in 0..5 {
            store
                .insert_availability(CreateAvailabilityRequest {
                    doctor_id: doctor.id,
                    day_of_week: day,
                    start_time: start,
                    end_time: end,
                    is_available: true,
                })
                .await?;
        }
    }

    for (name, phone, email) in SEED_PATIENTS {
        store
            .insert_patient(CreatePatientRequest {
                name: name.to_string(),
                phone: Some(phone.to_string()),
                email: Some(email.to_string()),
            })
            .await?;
    }

    info!(
        "Seeded demo clinic with {} doctors and {} patients",
        SEED_DOCTORS.len(),
        SEED_PATIENTS.len()
    );
    Ok(())
}
