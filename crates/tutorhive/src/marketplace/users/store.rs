//! Persistence seam for accounts.

use async_trait::async_trait;

use super::domain::{UserAccount, UserId};
use crate::marketplace::store::StoreError;

/// Store contract for accounts. `insert` must enforce email uniqueness and
/// fail with [`StoreError::Conflict`] on a duplicate.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, account: UserAccount) -> Result<UserAccount, StoreError>;

    async fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError>;

    async fn list(&self) -> Result<Vec<UserAccount>, StoreError>;

    async fn list_by_role(&self, role: &str) -> Result<Vec<UserAccount>, StoreError>;

    async fn replace(&self, account: UserAccount) -> Result<(), StoreError>;

    async fn delete(&self, id: &UserId) -> Result<(), StoreError>;
}
