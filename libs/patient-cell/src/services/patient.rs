use tracing::{debug, info};

use shared_database::{SharedStore, StoreError};
use shared_models::{CreatePatientRequest, Patient};

use crate::models::PatientError;

pub struct PatientService {
    store: SharedStore,
}

impl PatientService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        let request = request.validated()?;
        let phone = request.phone.clone();

        let patient = self.store.insert_patient(request).await.map_err(|e| match (e, phone) {
            (StoreError::Conflict(_), Some(phone)) => PatientError::PhoneAlreadyRegistered(phone),
            (other, _) => PatientError::Store(other),
        })?;

        info!("Registered patient {} ({})", patient.id, patient.name);
        Ok(patient)
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        Ok(self.store.list_patients().await?)
    }

    pub async fn get_by_phone(&self, phone: &str) -> Result<Patient, PatientError> {
        self.store
            .find_patient_by_phone(phone.trim())
            .await?
            .ok_or_else(|| PatientError::NotFound(phone.to_string()))
    }

    /// Returns the patient registered under `phone`, registering `name` with
    /// that phone when there is none. A blank phone always registers a new
    /// patient without one.
    pub async fn find_or_register(&self, name: &str, phone: &str) -> Result<Patient, PatientError> {
        let request = CreatePatientRequest {
            name: name.to_string(),
            phone: Some(phone.to_string()),
            email: None,
        }
        .validated()?;

        let Some(phone) = request.phone.clone() else {
            debug!("No phone supplied, registering '{}' as a new patient", request.name);
            return Ok(self.store.insert_patient(request).await?);
        };

        if let Some(existing) = self.store.find_patient_by_phone(&phone).await? {
            debug!("Reusing patient {} for phone {}", existing.id, phone);
            return Ok(existing);
        }

        match self.store.insert_patient(request).await {
            Ok(patient) => {
                info!("Registered patient {} ({}) during booking", patient.id, patient.name);
                Ok(patient)
            }
            // Registered concurrently under the same phone.
            Err(StoreError::Conflict(_)) => self.get_by_phone(&phone).await,
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_database::{ClinicStore, InMemoryStore};
    use shared_models::AppError;
    use shared_utils::test_utils::seeded_store;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_and_lookup_by_phone() {
        let service = PatientService::new(Arc::new(InMemoryStore::new()));

        let created = service
            .create_patient(CreatePatientRequest {
                name: "Maria Garcia".to_string(),
                phone: Some("+15550100".to_string()),
                email: Some("".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(created.email, None);

        let found = service.get_by_phone("+15550100").await.unwrap();
        assert_eq!(found.id, created.id);

        assert_matches!(service.get_by_phone("+19999999").await, Err(PatientError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_conflict() {
        let service = PatientService::new(seeded_store().await);

        let result = service
            .create_patient(CreatePatientRequest {
                name: "Johnny Smith".to_string(),
                phone: Some("+1234567890".to_string()),
                email: None,
            })
            .await;

        assert_matches!(result, Err(PatientError::PhoneAlreadyRegistered(_)));
        assert_matches!(AppError::from(result.unwrap_err()), AppError::Conflict(_));
    }

    #[tokio::test]
    async fn test_find_or_register_reuses_phone() {
        let store = seeded_store().await;
        let service = PatientService::new(store.clone());

        let existing = service.find_or_register("Someone Else", "+1234567891").await.unwrap();
        assert_eq!(existing.name, "Jane Doe");

        let fresh = service.find_or_register("Tom Baker", "+15550123").await.unwrap();
        let again = service.find_or_register("Tom Baker", "+15550123").await.unwrap();
        assert_eq!(fresh.id, again.id);
        assert_eq!(store.list_patients().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_blank_phone_always_registers() {
        let store = seeded_store().await;
        let service = PatientService::new(store.clone());

        let first = service.find_or_register("Walk In", "").await.unwrap();
        let second = service.find_or_register("Walk In", "  ").await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.phone, None);
        assert_eq!(store.list_patients().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_missing_name_is_rejected() {
        let service = PatientService::new(seeded_store().await);

        let result = service.find_or_register(" ", "+15550999").await;

        assert_matches!(result, Err(PatientError::Validation(AppError::ValidationError(_))));
    }
}
