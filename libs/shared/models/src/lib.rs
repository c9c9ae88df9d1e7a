pub mod clinic;
pub mod error;

pub use clinic::{
    Appointment, AppointmentStatus, AvailabilityWindow, CreateAppointmentRequest,
    CreateAvailabilityRequest, CreateDoctorRequest, CreatePatientRequest, Doctor,
    DoctorSummary, Patient,
};
pub use clinic::day_of_week;
pub use error::AppError;
