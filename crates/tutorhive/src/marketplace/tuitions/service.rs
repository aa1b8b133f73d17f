use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::domain::{
    TuitionId, TuitionListing, TuitionPatch, TuitionPosting, TuitionRecord, TuitionStatus,
};
use super::store::TuitionStore;
use crate::marketplace::store::StoreError;

/// Manager owning the posting lifecycle. Creation always lands as `Pending`;
/// only `set_status` moves a posting to `Approved` or `Rejected`.
pub struct TuitionService<S> {
    store: Arc<S>,
}

static TUITION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_tuition_id() -> TuitionId {
    let id = TUITION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    TuitionId(format!("tui-{id:06}"))
}

impl<S> TuitionService<S>
where
    S: TuitionStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Store a new posting under a fresh id.
    pub async fn create(
        &self,
        posting: TuitionPosting,
    ) -> Result<TuitionRecord, TuitionServiceError> {
        if posting.posted_by.email.trim().is_empty() {
            return Err(TuitionServiceError::MissingPosterEmail);
        }

        let record = TuitionRecord {
            id: next_tuition_id(),
            status: TuitionStatus::Pending,
            posted_by: posting.posted_by,
            schedule: posting.schedule,
            start_date: posting.start_date,
            details: posting.details,
        };

        let stored = self.store.insert(record).await?;
        Ok(stored)
    }

    pub async fn get(&self, id: &TuitionId) -> Result<TuitionRecord, TuitionServiceError> {
        let record = self.store.fetch(id).await?.ok_or(StoreError::NotFound)?;
        Ok(record)
    }

    /// Public board entries, optionally narrowed to one status.
    pub async fn listings(
        &self,
        status: Option<TuitionStatus>,
    ) -> Result<Vec<TuitionListing>, TuitionServiceError> {
        let records = match status {
            Some(status) => self.store.list_by_status(status).await?,
            None => self.store.list().await?,
        };
        Ok(records.iter().map(TuitionRecord::listing_view).collect())
    }

    /// Owner view: full records for everything one student posted.
    pub async fn posted_by(&self, email: &str) -> Result<Vec<TuitionRecord>, TuitionServiceError> {
        let records = self.store.list_by_poster(email).await?;
        Ok(records)
    }

    /// Unconditional status overwrite used by the moderation flow.
    pub async fn set_status(
        &self,
        id: &TuitionId,
        status: TuitionStatus,
    ) -> Result<TuitionRecord, TuitionServiceError> {
        let mut record = self.store.fetch(id).await?.ok_or(StoreError::NotFound)?;
        record.status = status;
        self.store.replace(record.clone()).await?;
        Ok(record)
    }

    /// Merge a patch into the posting payload. Status and poster identity
    /// stay as stored; the patch type cannot carry them.
    pub async fn update_fields(
        &self,
        id: &TuitionId,
        patch: TuitionPatch,
    ) -> Result<TuitionRecord, TuitionServiceError> {
        let mut record = self.store.fetch(id).await?.ok_or(StoreError::NotFound)?;

        if let Some(schedule) = patch.schedule {
            record.schedule = Some(schedule);
        }
        if let Some(start_date) = patch.start_date {
            record.start_date = Some(start_date);
        }
        for (key, value) in patch.details {
            record.details.insert(key, value);
        }

        self.store.replace(record.clone()).await?;
        Ok(record)
    }

    /// Remove a posting. Applications pointing at it are left in place.
    pub async fn delete(&self, id: &TuitionId) -> Result<(), TuitionServiceError> {
        self.store.delete(id).await?;
        Ok(())
    }
}

/// Error raised by the tuition manager.
#[derive(Debug, thiserror::Error)]
pub enum TuitionServiceError {
    #[error("poster email is required")]
    MissingPosterEmail,
    #[error(transparent)]
    Store(#[from] StoreError),
}
