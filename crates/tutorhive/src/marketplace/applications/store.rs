use async_trait::async_trait;

use super::domain::{ApplicationId, ApplicationRecord};
use crate::marketplace::store::StoreError;
use crate::marketplace::tuitions::TuitionId;

/// Storage port for tutor applications.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, StoreError>;
    async fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError>;
    /// Every stored application for one (tutor, tuition) pair. Emptiness of
    /// the returned set is the existence test; adapters must not collapse it
    /// to a boolean.
    async fn find_pair(
        &self,
        tutor_email: &str,
        tuition_id: &TuitionId,
    ) -> Result<Vec<ApplicationRecord>, StoreError>;
    async fn list_by_tutor(&self, email: &str) -> Result<Vec<ApplicationRecord>, StoreError>;
    async fn list_by_student(&self, email: &str) -> Result<Vec<ApplicationRecord>, StoreError>;
    async fn replace(&self, record: ApplicationRecord) -> Result<(), StoreError>;
    async fn delete(&self, id: &ApplicationId) -> Result<(), StoreError>;
}
