//! Account signup and profile management.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::domain::{SignupDraft, SignupOutcome, TutorCard, UserAccount, UserId};
use super::store::UserStore;
use crate::marketplace::store::StoreError;

const TUTOR_ROLE: &str = "tutor";

static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_user_id() -> UserId {
    let id = USER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UserId(format!("usr-{id:06}"))
}

/// Fields an account holder may change after signup. Email and role are
/// fixed at creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

/// Manages accounts; email is the natural key and signup is idempotent on
/// it.
pub struct UserService<S> {
    store: Arc<S>,
}

impl<S> UserService<S>
where
    S: UserStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Registers an account. A known email reports
    /// [`SignupOutcome::AlreadyRegistered`] with the stored account and
    /// writes nothing.
    pub async fn create(&self, draft: SignupDraft) -> Result<SignupOutcome, UserServiceError> {
        if draft.email.trim().is_empty() {
            return Err(UserServiceError::MissingEmail);
        }

        if let Some(existing) = self.store.find_by_email(&draft.email).await? {
            debug!(email = %draft.email, "signup for known email is a no-op");
            return Ok(SignupOutcome::AlreadyRegistered(existing));
        }

        let email = draft.email.clone();
        let account = UserAccount {
            id: next_user_id(),
            email: draft.email,
            name: draft.name,
            role: draft.role,
            profile: draft.profile,
        };
        match self.store.insert(account).await {
            Ok(stored) => Ok(SignupOutcome::Created(stored)),
            Err(StoreError::Conflict) => {
                // Concurrent signup won the email; report theirs.
                let winner = self
                    .store
                    .find_by_email(&email)
                    .await?
                    .ok_or(StoreError::NotFound)?;
                Ok(SignupOutcome::AlreadyRegistered(winner))
            }
            Err(error) => Err(error.into()),
        }
    }

    pub async fn get(&self, id: &UserId) -> Result<UserAccount, UserServiceError> {
        let account = self.store.fetch(id).await?.ok_or(StoreError::NotFound)?;
        Ok(account)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<UserAccount, UserServiceError> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(account)
    }

    pub async fn list(&self) -> Result<Vec<UserAccount>, UserServiceError> {
        Ok(self.store.list().await?)
    }

    /// Public tutor directory; see [`UserAccount::tutor_card`] for what is
    /// withheld.
    pub async fn list_tutors(&self) -> Result<Vec<TutorCard>, UserServiceError> {
        let tutors = self.store.list_by_role(TUTOR_ROLE).await?;
        Ok(tutors.iter().map(UserAccount::tutor_card).collect())
    }

    pub async fn update(
        &self,
        id: &UserId,
        patch: AccountPatch,
    ) -> Result<UserAccount, UserServiceError> {
        let mut account = self.store.fetch(id).await?.ok_or(StoreError::NotFound)?;
        if let Some(name) = patch.name {
            account.name = name;
        }
        for (key, value) in patch.profile {
            account.profile.insert(key, value);
        }
        self.store.replace(account.clone()).await?;
        Ok(account)
    }

    pub async fn delete(&self, id: &UserId) -> Result<(), UserServiceError> {
        self.store.delete(id).await?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("email is required")]
    MissingEmail,
    #[error(transparent)]
    Store(#[from] StoreError),
}
