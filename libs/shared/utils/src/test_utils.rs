use std::sync::Arc;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime, Weekday};
use serde_json::json;

use shared_config::AppConfig;
use shared_database::seed::seed_clinic;
use shared_database::InMemoryStore;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_api_key: String,
    pub openai_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_api_key: "test-service-key".to_string(),
            openai_api_key: "test-openai-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_supabase(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_api_key: self.supabase_api_key.clone(),
            openai_api_key: self.openai_api_key.clone(),
            ..Default::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// In-memory store preloaded with the demo clinic.
pub async fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    if let Err(e) = seed_clinic(store.as_ref()).await {
        panic!("seeding the in-memory clinic failed: {}", e);
    }
    store
}

/// First date strictly after today that falls on `weekday`.
pub fn next_weekday(weekday: Weekday) -> NaiveDate {
    let today = Local::now().date_naive();
    let ahead = (7 + weekday.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        % 7;
    today + Duration::days(if ahead == 0 { 7 } else { ahead })
}

pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_row(id: i64, name: &str, specialty: &str, department: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "specialty": specialty,
            "department": department,
            "created_at": "2024-01-01T00:00:00+00:00"
        })
    }

    pub fn patient_row(id: i64, name: &str, phone: Option<&str>) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "phone": phone,
            "email": null,
            "created_at": "2024-01-01T00:00:00+00:00"
        })
    }

    pub fn window_row(id: i64, doctor_id: i64, day_of_week: i32, start: &str, end: &str) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "day_of_week": day_of_week,
            "start_time": start,
            "end_time": end,
            "is_available": true
        })
    }

    pub fn appointment_row(id: i64, doctor_id: i64, patient_id: i64, at: &str) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "appointment_date": at,
            "status": "scheduled",
            "notes": null,
            "created_at": "2024-01-01T00:00:00+00:00"
        })
    }

    pub fn unique_violation(constraint: &str) -> serde_json::Value {
        json!({
            "code": "23505",
            "details": null,
            "hint": null,
            "message": format!("duplicate key value violates unique constraint \"{}\"", constraint)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_weekday_is_in_the_future() {
        let today = Local::now().date_naive();
        for weekday in [Weekday::Mon, Weekday::Wed, Weekday::Sun] {
            let date = next_weekday(weekday);
            assert_eq!(date.weekday(), weekday);
            assert!(date > today);
            assert!(date <= today + Duration::days(7));
        }
    }

    #[tokio::test]
    async fn test_seeded_store_contents() {
        let store = seeded_store().await;

        use shared_database::ClinicStore;

        assert_eq!(store.list_doctors().await.unwrap().len(), 5);
        assert_eq!(store.list_availability().await.unwrap().len(), 25);
        assert_eq!(store.list_patients().await.unwrap().len(), 2);
        assert!(store.find_open_window(1, 5).await.unwrap().is_none());
    }
}
