use tracing::{debug, info};

use shared_database::SharedStore;
use shared_models::{AppError, CreateDoctorRequest, Doctor};

pub struct DoctorService {
    store: SharedStore,
}

impl DoctorService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, AppError> {
        let request = request.validated()?;
        let doctor = self.store.insert_doctor(request).await?;

        info!("Created doctor {} ({})", doctor.id, doctor.name);
        Ok(doctor)
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, AppError> {
        Ok(self.store.list_doctors().await?)
    }

    /// First doctor whose name contains `name`, ignoring case.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Doctor>, AppError> {
        debug!("Looking up doctor by name fragment '{}'", name);
        Ok(self.store.find_doctor_by_name(name.trim()).await?)
    }

    pub async fn find_by_specialty(&self, specialty: &str) -> Result<Vec<Doctor>, AppError> {
        debug!("Looking up doctors by specialty fragment '{}'", specialty);
        Ok(self.store.find_doctors_by_specialty(specialty.trim()).await?)
    }
}
