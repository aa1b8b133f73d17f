use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationRequest, ApplicationStatus, ReapplyScope,
};
use super::store::ApplicationStore;
use crate::marketplace::store::StoreError;
use crate::marketplace::tuitions::TuitionId;

const APPLY_SHARDS: usize = 16;

/// Manager owning tutor applications and the one-application-per-pair rule.
pub struct ApplicationService<S> {
    store: Arc<S>,
    scope: ReapplyScope,
    apply_locks: Vec<Mutex<()>>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<S> ApplicationService<S>
where
    S: ApplicationStore + 'static,
{
    pub fn new(store: Arc<S>, scope: ReapplyScope) -> Self {
        let apply_locks = (0..APPLY_SHARDS).map(|_| Mutex::new(())).collect();
        Self {
            store,
            scope,
            apply_locks,
        }
    }

    /// Submit an application. The duplicate check and the insert run under a
    /// per-pair lock so two concurrent submissions for the same pair cannot
    /// both pass the emptiness test.
    pub async fn apply(
        &self,
        request: ApplicationRequest,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        if request.tutor_email.trim().is_empty() {
            return Err(ApplicationServiceError::MissingField("tutor_email"));
        }
        if request.student_email.trim().is_empty() {
            return Err(ApplicationServiceError::MissingField("student_email"));
        }
        if request.tuition_id.0.trim().is_empty() {
            return Err(ApplicationServiceError::MissingField("tuition_id"));
        }

        let _guard = self
            .pair_lock(&request.tutor_email, &request.tuition_id)
            .lock()
            .await;

        let existing = self
            .store
            .find_pair(&request.tutor_email, &request.tuition_id)
            .await?;
        if let Some(blocking) = self.blocking_record(&existing) {
            debug!(
                tutor = %request.tutor_email,
                tuition = %request.tuition_id.0,
                blocked_by = %blocking.id.0,
                "duplicate application blocked"
            );
            return Err(ApplicationServiceError::AlreadyApplied {
                tutor_email: request.tutor_email,
                tuition_id: request.tuition_id,
            });
        }

        let record = ApplicationRecord {
            id: next_application_id(),
            tuition_id: request.tuition_id,
            tutor_email: request.tutor_email,
            student_email: request.student_email,
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
            details: request.details,
        };

        let stored = self.store.insert(record).await?;
        Ok(stored)
    }

    /// True when a blocking application exists for the pair. Shares the
    /// emptiness test and scope filter with `apply`, so the two cannot
    /// disagree.
    pub async fn check_applied(
        &self,
        tutor_email: &str,
        tuition_id: &TuitionId,
    ) -> Result<bool, ApplicationServiceError> {
        let existing = self.store.find_pair(tutor_email, tuition_id).await?;
        Ok(self.blocking_record(&existing).is_some())
    }

    pub async fn get(
        &self,
        id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self.store.fetch(id).await?.ok_or(StoreError::NotFound)?;
        Ok(record)
    }

    /// Turn down an application on behalf of the student.
    pub async fn reject(
        &self,
        id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self.store.fetch(id).await?.ok_or(StoreError::NotFound)?;
        record.status = ApplicationStatus::Rejected;
        self.store.replace(record.clone()).await?;
        Ok(record)
    }

    pub async fn list_by_tutor(
        &self,
        email: &str,
    ) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        let records = self.store.list_by_tutor(email).await?;
        Ok(records)
    }

    pub async fn list_by_student(
        &self,
        email: &str,
    ) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        let records = self.store.list_by_student(email).await?;
        Ok(records)
    }

    /// Merge a patch into the application details. Status, emails, and ids
    /// stay as stored.
    pub async fn update_details(
        &self,
        id: &ApplicationId,
        patch: Map<String, Value>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self.store.fetch(id).await?.ok_or(StoreError::NotFound)?;
        for (key, value) in patch {
            record.details.insert(key, value);
        }
        self.store.replace(record.clone()).await?;
        Ok(record)
    }

    /// Withdraw an application. Settled applications stay put; they anchor
    /// the payment audit trail.
    pub async fn delete(&self, id: &ApplicationId) -> Result<(), ApplicationServiceError> {
        let record = self.store.fetch(id).await?.ok_or(StoreError::NotFound)?;
        if record.status == ApplicationStatus::Paid {
            return Err(ApplicationServiceError::SettledRecordImmutable);
        }
        self.store.delete(id).await?;
        Ok(())
    }

    fn blocking_record<'a>(
        &self,
        records: &'a [ApplicationRecord],
    ) -> Option<&'a ApplicationRecord> {
        records
            .iter()
            .find(|record| self.scope.blocks(record.status))
    }

    fn pair_lock(&self, tutor_email: &str, tuition_id: &TuitionId) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        tutor_email.hash(&mut hasher);
        tuition_id.0.hash(&mut hasher);
        // distinct pairs may share a shard; that only serializes them
        let index = (hasher.finish() as usize) % self.apply_locks.len();
        &self.apply_locks[index]
    }
}

/// Error raised by the application manager.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("tutor {tutor_email} has already applied to tuition {}", tuition_id.0)]
    AlreadyApplied {
        tutor_email: String,
        tuition_id: TuitionId,
    },
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("settled applications cannot be deleted")]
    SettledRecordImmutable,
    #[error(transparent)]
    Store(#[from] StoreError),
}
