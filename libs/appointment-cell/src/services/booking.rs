// libs/appointment-cell/src/services/booking.rs
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use doctor_cell::models::{parse_slot, SlotAvailability, UnavailableReason};
use doctor_cell::AvailabilityService;
use patient_cell::PatientService;
use shared_database::{SharedStore, StoreError};
use shared_models::{Appointment, CreateAppointmentRequest};
use shared_utils::KeyedLocks;

use crate::models::{AppointmentError, BookingOutcome, BookingRequest};

pub struct AppointmentBookingService {
    store: SharedStore,
    availability: AvailabilityService,
    patients: PatientService,
    slot_locks: KeyedLocks<(i64, NaiveDateTime)>,
}

impl AppointmentBookingService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            availability: AvailabilityService::new(store.clone()),
            patients: PatientService::new(store.clone()),
            slot_locks: KeyedLocks::new(),
            store,
        }
    }

    /// Books by doctor name. Unavailability is a normal outcome with
    /// `success: false`; only storage or validation faults are errors.
    pub async fn book(&self, request: BookingRequest) -> Result<BookingOutcome, AppointmentError> {
        info!(
            "Booking request: '{}' with '{}' at {} {}",
            request.patient_name, request.doctor_name, request.appointment_date, request.appointment_time
        );

        let outcome = self
            .availability
            .check(&request.doctor_name, &request.appointment_date, &request.appointment_time)
            .await?;

        let doctor = match outcome {
            SlotAvailability::Available { doctor } => doctor,
            SlotAvailability::Unavailable { reason } => {
                debug!("Booking rejected: {}", reason);
                return Ok(BookingOutcome::rejected(reason));
            }
        };

        let Some(at) = parse_slot(&request.appointment_date, &request.appointment_time) else {
            return Ok(BookingOutcome::rejected(UnavailableReason::InvalidDateTime));
        };

        let _slot = self.slot_locks.lock((doctor.id, at)).await;

        // Another booking may have taken the slot while we waited for the lock.
        if let SlotAvailability::Unavailable { reason } = self.availability.check_slot(doctor.clone(), at).await? {
            debug!("Booking rejected after re-check: {}", reason);
            return Ok(BookingOutcome::rejected(reason));
        }

        let patient = self
            .patients
            .find_or_register(&request.patient_name, &request.patient_phone)
            .await?;

        let appointment = CreateAppointmentRequest {
            doctor_id: doctor.id,
            patient_id: patient.id,
            appointment_date: at,
            notes: Some(request.notes),
        }
        .validated()?;

        let appointment = match self.store.insert_appointment(appointment).await {
            Ok(appointment) => appointment,
            Err(StoreError::Conflict(msg)) => {
                warn!("Slot for doctor {} at {} taken on insert: {}", doctor.id, at, msg);
                return Ok(BookingOutcome::rejected(UnavailableReason::AlreadyBooked));
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "Booked appointment {} for patient {} with doctor {} at {}",
            appointment.id, patient.id, doctor.id, at
        );

        Ok(BookingOutcome::confirmed(
            appointment.id,
            &doctor.name,
            &patient.name,
            &request.appointment_date,
            &request.appointment_time,
        ))
    }

    /// Direct creation by ids. Does not consult availability windows.
    pub async fn create_appointment(&self, request: CreateAppointmentRequest) -> Result<Appointment, AppointmentError> {
        let request = request.validated()?;

        if self.store.get_doctor(request.doctor_id).await?.is_none() {
            return Err(AppointmentError::DoctorNotFound(request.doctor_id));
        }
        if self.store.get_patient(request.patient_id).await?.is_none() {
            return Err(AppointmentError::PatientNotFound(request.patient_id));
        }

        let doctor_id = request.doctor_id;
        let at = request.appointment_date;
        let _slot = self.slot_locks.lock((doctor_id, at)).await;

        if self.store.find_scheduled_appointment(doctor_id, at).await?.is_some() {
            return Err(AppointmentError::SlotTaken { doctor_id, at });
        }

        let appointment = self.store.insert_appointment(request).await.map_err(|e| match e {
            StoreError::Conflict(_) => AppointmentError::SlotTaken { doctor_id, at },
            other => AppointmentError::Store(other),
        })?;

        info!("Created appointment {} for doctor {} at {}", appointment.id, doctor_id, at);
        Ok(appointment)
    }

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.store.list_appointments().await?)
    }

    pub async fn appointments_for_doctor(&self, doctor_id: i64) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.store.list_doctor_appointments(doctor_id).await?)
    }
}
