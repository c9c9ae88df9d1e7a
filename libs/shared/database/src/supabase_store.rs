use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use urlencoding::encode;

use shared_config::AppConfig;
use shared_models::{
    Appointment, AvailabilityWindow, CreateAppointmentRequest, CreateAvailabilityRequest,
    CreateDoctorRequest, CreatePatientRequest, Doctor, Patient,
};

use crate::store::{ClinicStore, StoreResult};
use crate::supabase::SupabaseClient;

/// Timestamp layout used in PostgREST filters on `timestamp` columns.
const TIMESTAMP_FILTER: &str = "%Y-%m-%dT%H:%M:%S";

/// [`ClinicStore`] backed by the Supabase REST API (PostgREST).
pub struct SupabaseStore {
    supabase: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn select<T>(&self, path: &str) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self.supabase.request(Method::GET, path, None).await?;
        Ok(rows)
    }

    async fn select_first<T>(&self, path: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self.select(path).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl ClinicStore for SupabaseStore {
    async fn insert_doctor(&self, request: CreateDoctorRequest) -> StoreResult<Doctor> {
        debug!("Creating doctor: {}", request.name);

        let doctor: Doctor = self
            .supabase
            .insert(
                "doctors",
                json!({
                    "name": request.name,
                    "specialty": request.specialty,
                    "department": request.department,
                }),
            )
            .await?;
        Ok(doctor)
    }

    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        self.select("/rest/v1/doctors?order=id.asc").await
    }

    async fn get_doctor(&self, doctor_id: i64) -> StoreResult<Option<Doctor>> {
        let path = format!("/rest/v1/doctors?id=eq.{}&limit=1", doctor_id);
        self.select_first(&path).await
    }

    async fn find_doctor_by_name(&self, fragment: &str) -> StoreResult<Option<Doctor>> {
        let path = format!(
            "/rest/v1/doctors?name=ilike.*{}*&order=id.asc&limit=1",
            encode(fragment)
        );
        self.select_first(&path).await
    }

    async fn find_doctors_by_specialty(&self, fragment: &str) -> StoreResult<Vec<Doctor>> {
        let path = format!(
            "/rest/v1/doctors?specialty=ilike.*{}*&order=id.asc",
            encode(fragment)
        );
        self.select(&path).await
    }

    async fn insert_patient(&self, request: CreatePatientRequest) -> StoreResult<Patient> {
        debug!("Creating patient: {}", request.name);

        let patient: Patient = self
            .supabase
            .insert(
                "patients",
                json!({
                    "name": request.name,
                    "phone": request.phone,
                    "email": request.email,
                }),
            )
            .await?;
        Ok(patient)
    }

    async fn list_patients(&self) -> StoreResult<Vec<Patient>> {
        self.select("/rest/v1/patients?order=id.asc").await
    }

    async fn get_patient(&self, patient_id: i64) -> StoreResult<Option<Patient>> {
        let path = format!("/rest/v1/patients?id=eq.{}&limit=1", patient_id);
        self.select_first(&path).await
    }

    async fn find_patient_by_phone(&self, phone: &str) -> StoreResult<Option<Patient>> {
        let path = format!(
            "/rest/v1/patients?phone=eq.{}&order=id.asc&limit=1",
            encode(phone)
        );
        self.select_first(&path).await
    }

    async fn insert_availability(&self, request: CreateAvailabilityRequest) -> StoreResult<AvailabilityWindow> {
        debug!(
            "Creating availability window for doctor {} on day {}",
            request.doctor_id, request.day_of_week
        );

        let window: AvailabilityWindow = self
            .supabase
            .insert("doctor_availability", serde_json::to_value(&request)?)
            .await?;
        Ok(window)
    }

    async fn list_availability(&self) -> StoreResult<Vec<AvailabilityWindow>> {
        self.select("/rest/v1/doctor_availability?order=id.asc").await
    }

    async fn find_open_window(&self, doctor_id: i64, day_of_week: i32) -> StoreResult<Option<AvailabilityWindow>> {
        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=eq.{}&day_of_week=eq.{}&is_available=eq.true&order=id.asc&limit=1",
            doctor_id, day_of_week
        );
        self.select_first(&path).await
    }

    async fn insert_appointment(&self, request: CreateAppointmentRequest) -> StoreResult<Appointment> {
        debug!(
            "Creating appointment for doctor {} at {}",
            request.doctor_id, request.appointment_date
        );

        let appointment: Appointment = self
            .supabase
            .insert(
                "appointments",
                json!({
                    "doctor_id": request.doctor_id,
                    "patient_id": request.patient_id,
                    "appointment_date": request.appointment_date.format(TIMESTAMP_FILTER).to_string(),
                    "status": "scheduled",
                    "notes": request.notes,
                }),
            )
            .await?;
        Ok(appointment)
    }

    async fn list_appointments(&self) -> StoreResult<Vec<Appointment>> {
        self.select("/rest/v1/appointments?order=appointment_date.asc,id.asc").await
    }

    async fn list_doctor_appointments(&self, doctor_id: i64) -> StoreResult<Vec<Appointment>> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&order=appointment_date.asc,id.asc",
            doctor_id
        );
        self.select(&path).await
    }

    async fn find_scheduled_appointment(
        &self,
        doctor_id: i64,
        at: NaiveDateTime,
    ) -> StoreResult<Option<Appointment>> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_date=eq.{}&status=eq.scheduled&limit=1",
            doctor_id,
            at.format(TIMESTAMP_FILTER)
        );
        self.select_first(&path).await
    }
}
