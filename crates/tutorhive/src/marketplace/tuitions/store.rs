use async_trait::async_trait;

use super::domain::{TuitionId, TuitionRecord, TuitionStatus};
use crate::marketplace::store::StoreError;

/// Storage port for tuition postings. Addressed by id or field equality,
/// matching what a document store offers.
#[async_trait]
pub trait TuitionStore: Send + Sync {
    async fn insert(&self, record: TuitionRecord) -> Result<TuitionRecord, StoreError>;
    async fn fetch(&self, id: &TuitionId) -> Result<Option<TuitionRecord>, StoreError>;
    async fn list(&self) -> Result<Vec<TuitionRecord>, StoreError>;
    async fn list_by_status(&self, status: TuitionStatus)
        -> Result<Vec<TuitionRecord>, StoreError>;
    async fn list_by_poster(&self, email: &str) -> Result<Vec<TuitionRecord>, StoreError>;
    async fn replace(&self, record: TuitionRecord) -> Result<(), StoreError>;
    async fn delete(&self, id: &TuitionId) -> Result<(), StoreError>;
}
