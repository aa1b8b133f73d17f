//! Persistence seam for payment records.

use async_trait::async_trait;

use super::domain::{PaymentId, PaymentRecord, TransactionId};
use crate::marketplace::store::StoreError;

/// Store contract for payment records.
///
/// `insert` must enforce uniqueness of `transaction_id` and fail with
/// [`StoreError::Conflict`] on a duplicate. Reconciliation leans on that
/// contract to elect exactly one winner per transaction.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, record: PaymentRecord) -> Result<PaymentRecord, StoreError>;

    async fn fetch(&self, id: &PaymentId) -> Result<Option<PaymentRecord>, StoreError>;

    async fn find_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<PaymentRecord>, StoreError>;

    async fn list_by_student(&self, email: &str) -> Result<Vec<PaymentRecord>, StoreError>;

    async fn list_by_tutor(&self, email: &str) -> Result<Vec<PaymentRecord>, StoreError>;

    async fn replace(&self, record: PaymentRecord) -> Result<(), StoreError>;
}
