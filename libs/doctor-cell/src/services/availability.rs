use chrono::NaiveDateTime;
use tracing::{debug, info};

use shared_database::{SharedStore, StoreResult};
use shared_models::{
    day_of_week, AppError, AvailabilityWindow, CreateAvailabilityRequest, Doctor, DoctorSummary,
};

use crate::models::{parse_slot, SlotAvailability, UnavailableReason};

pub struct AvailabilityService {
    store: SharedStore,
}

impl AvailabilityService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create_window(&self, request: CreateAvailabilityRequest) -> Result<AvailabilityWindow, AppError> {
        let request = request.validated()?;
        let window = self.store.insert_availability(request).await?;

        info!(
            "Created availability window {} for doctor {} on day {}",
            window.id, window.doctor_id, window.day_of_week
        );
        Ok(window)
    }

    pub async fn list_windows(&self) -> Result<Vec<AvailabilityWindow>, AppError> {
        Ok(self.store.list_availability().await?)
    }

    /// Decides whether the doctor matching `doctor_name` can take the slot.
    /// Domain rejections come back as [`SlotAvailability::Unavailable`]; only
    /// storage failures are errors.
    pub async fn check(&self, doctor_name: &str, date: &str, time: &str) -> StoreResult<SlotAvailability> {
        debug!("Checking availability of '{}' at {} {}", doctor_name, date, time);

        let Some(doctor) = self.store.find_doctor_by_name(doctor_name.trim()).await? else {
            return Ok(SlotAvailability::unavailable(UnavailableReason::DoctorNotFound));
        };

        let Some(at) = parse_slot(date, time) else {
            return Ok(SlotAvailability::unavailable(UnavailableReason::InvalidDateTime));
        };

        self.check_slot(doctor, at).await
    }

    /// Checks an already resolved doctor against existing bookings and the
    /// weekly window for that day.
    pub async fn check_slot(&self, doctor: Doctor, at: NaiveDateTime) -> StoreResult<SlotAvailability> {
        if self.store.find_scheduled_appointment(doctor.id, at).await?.is_some() {
            return Ok(SlotAvailability::unavailable(UnavailableReason::AlreadyBooked));
        }

        let day = day_of_week(at.date());
        let Some(window) = self.store.find_open_window(doctor.id, day).await? else {
            return Ok(SlotAvailability::unavailable(UnavailableReason::DayUnavailable));
        };

        if !window.covers(at.time()) {
            return Ok(SlotAvailability::unavailable(UnavailableReason::OutsideWorkingHours));
        }

        Ok(SlotAvailability::Available { doctor })
    }

    /// Every doctor for which [`check`](Self::check) by name reports the slot
    /// as available, in directory order. Name resolution is first-match, so a
    /// doctor whose name is contained in an earlier doctor's name is judged by
    /// that earlier doctor.
    pub async fn available_doctors(&self, date: &str, time: &str) -> StoreResult<Vec<DoctorSummary>> {
        let mut available = Vec::new();
        for doctor in self.store.list_doctors().await? {
            if self.check(&doctor.name, date, time).await?.is_available() {
                available.push(DoctorSummary::from(&doctor));
            }
        }

        debug!("{} doctors available at {} {}", available.len(), date, time);
        Ok(available)
    }
}
