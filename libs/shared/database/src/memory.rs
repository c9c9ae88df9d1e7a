use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use shared_models::{
    Appointment, AppointmentStatus, AvailabilityWindow, CreateAppointmentRequest,
    CreateAvailabilityRequest, CreateDoctorRequest, CreatePatientRequest, Doctor, Patient,
};

use crate::store::{ClinicStore, StoreError, StoreResult};

struct Table<T> {
    rows: Vec<T>,
    last_id: i64,
}

impl<T> Table<T> {
    fn new() -> Self {
        Self { rows: Vec::new(), last_id: 0 }
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

struct Tables {
    doctors: Table<Doctor>,
    patients: Table<Patient>,
    windows: Table<AvailabilityWindow>,
    appointments: Table<Appointment>,
}

/// Process-local store used for tests and for running without Supabase.
/// Rows are kept in insertion order, which is also ascending id order.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                doctors: Table::new(),
                patients: Table::new(),
                windows: Table::new(),
                appointments: Table::new(),
            }),
        }
    }
}

fn contains_ignore_case(haystack: &str, fragment: &str) -> bool {
    haystack.to_lowercase().contains(&fragment.to_lowercase())
}

#[async_trait]
impl ClinicStore for InMemoryStore {
    async fn insert_doctor(&self, request: CreateDoctorRequest) -> StoreResult<Doctor> {
        let mut tables = self.tables.write().await;
        let doctor = Doctor {
            id: tables.doctors.next_id(),
            name: request.name,
            specialty: request.specialty,
            department: request.department,
            created_at: Utc::now(),
        };
        tables.doctors.rows.push(doctor.clone());
        debug!("Stored doctor {} in memory", doctor.id);
        Ok(doctor)
    }

    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        Ok(self.tables.read().await.doctors.rows.clone())
    }

    async fn get_doctor(&self, doctor_id: i64) -> StoreResult<Option<Doctor>> {
        let tables = self.tables.read().await;
        Ok(tables.doctors.rows.iter().find(|d| d.id == doctor_id).cloned())
    }

    async fn find_doctor_by_name(&self, fragment: &str) -> StoreResult<Option<Doctor>> {
        let tables = self.tables.read().await;
        Ok(tables
            .doctors
            .rows
            .iter()
            .find(|d| contains_ignore_case(&d.name, fragment))
            .cloned())
    }

    async fn find_doctors_by_specialty(&self, fragment: &str) -> StoreResult<Vec<Doctor>> {
        let tables = self.tables.read().await;
        Ok(tables
            .doctors
            .rows
            .iter()
            .filter(|d| contains_ignore_case(&d.specialty, fragment))
            .cloned()
            .collect())
    }

    async fn insert_patient(&self, request: CreatePatientRequest) -> StoreResult<Patient> {
        let mut tables = self.tables.write().await;

        if let Some(phone) = request.phone.as_deref() {
            if tables.patients.rows.iter().any(|p| p.phone.as_deref() == Some(phone)) {
                return Err(StoreError::Conflict(format!(
                    "a patient with phone {} already exists",
                    phone
                )));
            }
        }

        let patient = Patient {
            id: tables.patients.next_id(),
            name: request.name,
            phone: request.phone,
            email: request.email,
            created_at: Utc::now(),
        };
        tables.patients.rows.push(patient.clone());
        debug!("Stored patient {} in memory", patient.id);
        Ok(patient)
    }

    async fn list_patients(&self) -> StoreResult<Vec<Patient>> {
        Ok(self.tables.read().await.patients.rows.clone())
    }

    async fn get_patient(&self, patient_id: i64) -> StoreResult<Option<Patient>> {
        let tables = self.tables.read().await;
        Ok(tables.patients.rows.iter().find(|p| p.id == patient_id).cloned())
    }

    async fn find_patient_by_phone(&self, phone: &str) -> StoreResult<Option<Patient>> {
        let tables = self.tables.read().await;
        Ok(tables
            .patients
            .rows
            .iter()
            .find(|p| p.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn insert_availability(&self, request: CreateAvailabilityRequest) -> StoreResult<AvailabilityWindow> {
        let mut tables = self.tables.write().await;

        if !tables.doctors.rows.iter().any(|d| d.id == request.doctor_id) {
            return Err(StoreError::InvalidReference(format!(
                "doctor {} does not exist",
                request.doctor_id
            )));
        }

        let window = AvailabilityWindow {
            id: tables.windows.next_id(),
            doctor_id: request.doctor_id,
            day_of_week: request.day_of_week,
            start_time: request.start_time,
            end_time: request.end_time,
            is_available: request.is_available,
        };
        tables.windows.rows.push(window.clone());
        Ok(window)
    }

    async fn list_availability(&self) -> StoreResult<Vec<AvailabilityWindow>> {
        Ok(self.tables.read().await.windows.rows.clone())
    }

    async fn find_open_window(&self, doctor_id: i64, day_of_week: i32) -> StoreResult<Option<AvailabilityWindow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .windows
            .rows
            .iter()
            .find(|w| w.doctor_id == doctor_id && w.day_of_week == day_of_week && w.is_available)
            .cloned())
    }

    async fn insert_appointment(&self, request: CreateAppointmentRequest) -> StoreResult<Appointment> {
        let mut tables = self.tables.write().await;

        if !tables.doctors.rows.iter().any(|d| d.id == request.doctor_id) {
            return Err(StoreError::InvalidReference(format!(
                "doctor {} does not exist",
                request.doctor_id
            )));
        }
        if !tables.patients.rows.iter().any(|p| p.id == request.patient_id) {
            return Err(StoreError::InvalidReference(format!(
                "patient {} does not exist",
                request.patient_id
            )));
        }

        let taken = tables.appointments.rows.iter().any(|a| {
            a.doctor_id == request.doctor_id
                && a.appointment_date == request.appointment_date
                && a.status == AppointmentStatus::Scheduled
        });
        if taken {
            return Err(StoreError::Conflict(format!(
                "doctor {} already has an appointment at {}",
                request.doctor_id, request.appointment_date
            )));
        }

        let appointment = Appointment {
            id: tables.appointments.next_id(),
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
            appointment_date: request.appointment_date,
            status: AppointmentStatus::Scheduled,
            notes: request.notes,
            created_at: Utc::now(),
        };
        tables.appointments.rows.push(appointment.clone());
        debug!("Stored appointment {} in memory", appointment.id);
        Ok(appointment)
    }

    async fn list_appointments(&self) -> StoreResult<Vec<Appointment>> {
        let mut appointments = self.tables.read().await.appointments.rows.clone();
        appointments.sort_by_key(|a| (a.appointment_date, a.id));
        Ok(appointments)
    }

    async fn list_doctor_appointments(&self, doctor_id: i64) -> StoreResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .tables
            .read()
            .await
            .appointments
            .rows
            .iter()
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .collect();
        appointments.sort_by_key(|a| (a.appointment_date, a.id));
        Ok(appointments)
    }

    async fn find_scheduled_appointment(
        &self,
        doctor_id: i64,
        at: NaiveDateTime,
    ) -> StoreResult<Option<Appointment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .appointments
            .rows
            .iter()
            .find(|a| {
                a.doctor_id == doctor_id
                    && a.appointment_date == at
                    && a.status == AppointmentStatus::Scheduled
            })
            .cloned())
    }
}
