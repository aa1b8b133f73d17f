use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::marketplace::applications::domain::{
    ApplicationId, ApplicationRecord, ApplicationRequest, ApplicationStatus, ReapplyScope,
};
use crate::marketplace::applications::store::ApplicationStore;
use crate::marketplace::applications::{application_router, ApplicationService};
use crate::marketplace::store::StoreError;
use crate::marketplace::tuitions::TuitionId;

pub(super) fn request_for(tutor_email: &str, tuition_id: &str) -> ApplicationRequest {
    let mut details = Map::new();
    details.insert("qualification".to_string(), json!("BSc in Mathematics"));
    details.insert("expected_salary".to_string(), json!(500));

    ApplicationRequest {
        tuition_id: TuitionId(tuition_id.to_string()),
        tutor_email: tutor_email.to_string(),
        student_email: "ayesha@example.com".to_string(),
        details,
    }
}

pub(super) fn application_request() -> ApplicationRequest {
    request_for("raihan@example.com", "tui-100001")
}

pub(super) fn paid_record(tutor_email: &str, tuition_id: &str) -> ApplicationRecord {
    ApplicationRecord {
        id: ApplicationId(format!("app-settled-{tuition_id}")),
        tuition_id: TuitionId(tuition_id.to_string()),
        tutor_email: tutor_email.to_string(),
        student_email: "ayesha@example.com".to_string(),
        status: ApplicationStatus::Paid,
        applied_at: Utc::now(),
        details: Map::new(),
    }
}

pub(super) fn build_service(
    scope: ReapplyScope,
) -> (
    ApplicationService<MemoryApplicationStore>,
    Arc<MemoryApplicationStore>,
) {
    let store = Arc::new(MemoryApplicationStore::default());
    let service = ApplicationService::new(store.clone(), scope);
    (service, store)
}

pub(super) fn application_router_with_service(
    service: ApplicationService<MemoryApplicationStore>,
) -> axum::Router {
    application_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplicationStore {
    records: Arc<RwLock<HashMap<ApplicationId, ApplicationRecord>>>,
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn find_pair(
        &self,
        tutor_email: &str,
        tuition_id: &TuitionId,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|record| {
                record.tutor_email == tutor_email && record.tuition_id == *tuition_id
            })
            .cloned()
            .collect())
    }

    async fn list_by_tutor(&self, email: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|record| record.tutor_email == email)
            .cloned()
            .collect())
    }

    async fn list_by_student(&self, email: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|record| record.student_email == email)
            .cloned()
            .collect())
    }

    async fn replace(&self, record: ApplicationRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if !records.contains_key(&record.id) {
            return Err(StoreError::NotFound);
        }
        records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete(&self, id: &ApplicationId) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

impl MemoryApplicationStore {
    pub(super) async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl ApplicationStore for UnavailableStore {
    async fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn find_pair(
        &self,
        _tutor_email: &str,
        _tuition_id: &TuitionId,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn list_by_tutor(&self, _email: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn list_by_student(&self, _email: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn replace(&self, _record: ApplicationRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn delete(&self, _id: &ApplicationId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}
