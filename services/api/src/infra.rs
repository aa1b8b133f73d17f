use crate::stripe::StripeCheckoutClient;
use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tutorhive::marketplace::applications::{ApplicationId, ApplicationRecord, ApplicationStore};
use tutorhive::marketplace::payments::{
    CheckoutGateway, CheckoutRequest, CheckoutSession, GatewayError, PaymentId, PaymentRecord,
    PaymentStore, SessionPaymentStatus, TransactionId,
};
use tutorhive::marketplace::tuitions::{TuitionId, TuitionRecord, TuitionStatus, TuitionStore};
use tutorhive::marketplace::users::{UserAccount, UserId, UserStore};
use tutorhive::marketplace::StoreError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryTuitionStore {
    records: Arc<RwLock<HashMap<TuitionId, TuitionRecord>>>,
}

#[async_trait]
impl TuitionStore for InMemoryTuitionStore {
    async fn insert(&self, record: TuitionRecord) -> Result<TuitionRecord, StoreError> {
        let mut guard = self.records.write().await;
        if guard.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &TuitionId) -> Result<Option<TuitionRecord>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<TuitionRecord>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn list_by_status(
        &self,
        status: TuitionStatus,
    ) -> Result<Vec<TuitionRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.status == status)
            .cloned()
            .collect())
    }

    async fn list_by_poster(&self, email: &str) -> Result<Vec<TuitionRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.posted_by.email == email)
            .cloned()
            .collect())
    }

    async fn replace(&self, record: TuitionRecord) -> Result<(), StoreError> {
        let mut guard = self.records.write().await;
        if !guard.contains_key(&record.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete(&self, id: &TuitionId) -> Result<(), StoreError> {
        let mut guard = self.records.write().await;
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationStore {
    records: Arc<RwLock<HashMap<ApplicationId, ApplicationRecord>>>,
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, StoreError> {
        let mut guard = self.records.write().await;
        if guard.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_pair(
        &self,
        tutor_email: &str,
        tuition_id: &TuitionId,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| {
                record.tutor_email == tutor_email && record.tuition_id == *tuition_id
            })
            .cloned()
            .collect())
    }

    async fn list_by_tutor(&self, email: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.tutor_email == email)
            .cloned()
            .collect())
    }

    async fn list_by_student(&self, email: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.student_email == email)
            .cloned()
            .collect())
    }

    async fn replace(&self, record: ApplicationRecord) -> Result<(), StoreError> {
        let mut guard = self.records.write().await;
        if !guard.contains_key(&record.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete(&self, id: &ApplicationId) -> Result<(), StoreError> {
        let mut guard = self.records.write().await;
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPaymentStore {
    records: Arc<RwLock<HashMap<PaymentId, PaymentRecord>>>,
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, record: PaymentRecord) -> Result<PaymentRecord, StoreError> {
        let mut guard = self.records.write().await;
        let duplicate = guard
            .values()
            .any(|existing| existing.transaction_id == record.transaction_id);
        if duplicate || guard.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &PaymentId) -> Result<Option<PaymentRecord>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|record| record.transaction_id == *transaction_id)
            .cloned())
    }

    async fn list_by_student(&self, email: &str) -> Result<Vec<PaymentRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.student_email == email)
            .cloned()
            .collect())
    }

    async fn list_by_tutor(&self, email: &str) -> Result<Vec<PaymentRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.tutor_email == email)
            .cloned()
            .collect())
    }

    async fn replace(&self, record: PaymentRecord) -> Result<(), StoreError> {
        let mut guard = self.records.write().await;
        if !guard.contains_key(&record.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryUserStore {
    records: Arc<RwLock<HashMap<UserId, UserAccount>>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, account: UserAccount) -> Result<UserAccount, StoreError> {
        let mut guard = self.records.write().await;
        let duplicate = guard
            .values()
            .any(|existing| existing.email == account.email);
        if duplicate || guard.contains_key(&account.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<UserAccount>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn list_by_role(&self, role: &str) -> Result<Vec<UserAccount>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|account| account.role == role)
            .cloned()
            .collect())
    }

    async fn replace(&self, account: UserAccount) -> Result<(), StoreError> {
        let mut guard = self.records.write().await;
        if !guard.contains_key(&account.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(account.id.clone(), account);
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), StoreError> {
        let mut guard = self.records.write().await;
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

/// Stand-in processor used when no secret key is configured. Sessions live in
/// memory and flip to paid through [`SandboxCheckoutGateway::settle`], which
/// the demo drives in place of a customer completing checkout.
#[derive(Default)]
pub(crate) struct SandboxCheckoutGateway {
    sessions: RwLock<HashMap<String, CheckoutSession>>,
    sequence: AtomicU64,
}

impl SandboxCheckoutGateway {
    pub(crate) async fn settle(&self, session_id: &str) -> Option<TransactionId> {
        let mut guard = self.sessions.write().await;
        let session = guard.get_mut(session_id)?;
        let serial = self.sequence.fetch_add(1, Ordering::Relaxed);
        let transaction = TransactionId(format!("pi_sandbox_{serial:06}"));
        session.payment_status = SessionPaymentStatus::Paid;
        session.payment_intent = Some(transaction.clone());
        session.url = None;
        Some(transaction)
    }
}

#[async_trait]
impl CheckoutGateway for SandboxCheckoutGateway {
    async fn create_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let serial = self.sequence.fetch_add(1, Ordering::Relaxed);
        let id = format!("cs_sandbox_{serial:06}");
        let session = CheckoutSession {
            id: id.clone(),
            url: Some(format!("https://sandbox.checkout.invalid/pay/{id}")),
            payment_intent: None,
            payment_status: SessionPaymentStatus::Unpaid,
            amount_total: request.amount_minor,
            currency: request.currency,
            customer_email: Some(request.customer_email),
            metadata: request.metadata,
        };
        self.sessions.write().await.insert(id, session.clone());
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| GatewayError::SessionNotFound(session_id.to_string()))
    }
}

/// Processor selection fixed at startup: live client when a secret key is
/// configured, sandbox otherwise.
pub(crate) enum ApiCheckoutGateway {
    Sandbox(SandboxCheckoutGateway),
    Stripe(StripeCheckoutClient),
}

#[async_trait]
impl CheckoutGateway for ApiCheckoutGateway {
    async fn create_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        match self {
            ApiCheckoutGateway::Sandbox(gateway) => gateway.create_session(request).await,
            ApiCheckoutGateway::Stripe(client) => client.create_session(request).await,
        }
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
        match self {
            ApiCheckoutGateway::Sandbox(gateway) => gateway.retrieve_session(session_id).await,
            ApiCheckoutGateway::Stripe(client) => client.retrieve_session(session_id).await,
        }
    }
}
