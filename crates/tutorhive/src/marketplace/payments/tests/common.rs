use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::Utc;
use rust_decimal_macros::dec;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::marketplace::applications::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus,
};
use crate::marketplace::applications::ApplicationStore;
use crate::marketplace::payments::domain::{
    CheckoutInfo, PaymentId, PaymentRecord, PaymentStatus, TransactionId,
};
use crate::marketplace::payments::gateway::{
    CheckoutGateway, CheckoutMetadata, CheckoutRequest, CheckoutSession, GatewayError,
    SessionPaymentStatus,
};
use crate::marketplace::payments::store::PaymentStore;
use crate::marketplace::payments::{CheckoutConfig, PaymentService};
use crate::marketplace::store::StoreError;
use crate::marketplace::tuitions::TuitionId;

pub(super) fn engine_config() -> CheckoutConfig {
    CheckoutConfig {
        currency: "usd".to_string(),
        site_base_url: "http://localhost:5173".to_string(),
        processor_timeout: Duration::from_millis(250),
    }
}

pub(super) fn checkout_info() -> CheckoutInfo {
    CheckoutInfo {
        tuition_id: TuitionId("tui-100001".to_string()),
        application_id: ApplicationId("app-200001".to_string()),
        tutor_email: "raihan@example.com".to_string(),
        student_email: "ayesha@example.com".to_string(),
        rate: dec!(500),
    }
}

pub(super) fn session_metadata() -> CheckoutMetadata {
    CheckoutMetadata {
        tuition_id: "tui-100001".to_string(),
        application_id: "app-200001".to_string(),
        tutor_email: "raihan@example.com".to_string(),
        student_email: "ayesha@example.com".to_string(),
    }
}

pub(super) fn pending_application() -> ApplicationRecord {
    ApplicationRecord {
        id: ApplicationId("app-200001".to_string()),
        tuition_id: TuitionId("tui-100001".to_string()),
        tutor_email: "raihan@example.com".to_string(),
        student_email: "ayesha@example.com".to_string(),
        status: ApplicationStatus::Pending,
        applied_at: Utc::now(),
        details: Map::new(),
    }
}

pub(super) fn recording_claim(transaction_id: &str) -> PaymentRecord {
    PaymentRecord {
        id: PaymentId(format!("pay-claim-{transaction_id}")),
        transaction_id: TransactionId(transaction_id.to_string()),
        tuition_id: TuitionId("tui-100001".to_string()),
        application_id: ApplicationId("app-200001".to_string()),
        tutor_email: "raihan@example.com".to_string(),
        student_email: "ayesha@example.com".to_string(),
        amount: dec!(500),
        currency: "usd".to_string(),
        status: PaymentStatus::Recording,
        paid_at: Utc::now(),
    }
}

pub(super) fn paid_session(session_id: &str, transaction_id: &str) -> CheckoutSession {
    CheckoutSession {
        id: session_id.to_string(),
        url: None,
        payment_intent: Some(TransactionId(transaction_id.to_string())),
        payment_status: SessionPaymentStatus::Paid,
        amount_total: 50_000,
        currency: "usd".to_string(),
        customer_email: Some("ayesha@example.com".to_string()),
        metadata: session_metadata(),
    }
}

pub(super) fn unpaid_session(session_id: &str, transaction_id: &str) -> CheckoutSession {
    CheckoutSession {
        payment_status: SessionPaymentStatus::Unpaid,
        url: Some(format!("https://checkout.test/pay/{session_id}")),
        ..paid_session(session_id, transaction_id)
    }
}

pub(super) async fn build_engine() -> (
    PaymentService<MemoryPaymentStore, MemoryApplicationStore, ScriptedGateway>,
    Arc<MemoryPaymentStore>,
    Arc<MemoryApplicationStore>,
    Arc<ScriptedGateway>,
) {
    let gateway = Arc::new(ScriptedGateway::default());
    let (service, payments, applications) = build_engine_with_gateway(gateway.clone()).await;
    (service, payments, applications, gateway)
}

pub(super) async fn build_engine_with_gateway<G>(
    gateway: Arc<G>,
) -> (
    PaymentService<MemoryPaymentStore, MemoryApplicationStore, G>,
    Arc<MemoryPaymentStore>,
    Arc<MemoryApplicationStore>,
)
where
    G: CheckoutGateway + 'static,
{
    let payments = Arc::new(MemoryPaymentStore::default());
    let applications = Arc::new(MemoryApplicationStore::default());
    applications
        .insert(pending_application())
        .await
        .expect("seed application");
    let service = PaymentService::new(
        payments.clone(),
        applications.clone(),
        gateway,
        engine_config(),
    );
    (service, payments, applications)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 2048)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default, Clone)]
pub(super) struct MemoryPaymentStore {
    records: Arc<RwLock<HashMap<PaymentId, PaymentRecord>>>,
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn insert(&self, record: PaymentRecord) -> Result<PaymentRecord, StoreError> {
        let mut records = self.records.write().await;
        let duplicate = records.values().any(|existing| {
            existing.transaction_id == record.transaction_id || existing.id == record.id
        });
        if duplicate {
            return Err(StoreError::Conflict);
        }
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &PaymentId) -> Result<Option<PaymentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn find_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|record| record.transaction_id == *transaction_id)
            .cloned())
    }

    async fn list_by_student(&self, email: &str) -> Result<Vec<PaymentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|record| record.student_email == email)
            .cloned()
            .collect())
    }

    async fn list_by_tutor(&self, email: &str) -> Result<Vec<PaymentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|record| record.tutor_email == email)
            .cloned()
            .collect())
    }

    async fn replace(&self, record: PaymentRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if !records.contains_key(&record.id) {
            return Err(StoreError::NotFound);
        }
        records.insert(record.id.clone(), record);
        Ok(())
    }
}

impl MemoryPaymentStore {
    pub(super) async fn len(&self) -> usize {
        self.records.read().await.len()
    }
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

/// Gateway whose sessions are staged by the test ahead of time.
#[derive(Default)]
pub(super) struct ScriptedGateway {
    sessions: RwLock<HashMap<String, CheckoutSession>>,
    requests: RwLock<Vec<CheckoutRequest>>,
}

impl ScriptedGateway {
    pub(super) async fn stage(&self, session: CheckoutSession) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session);
    }

    pub(super) async fn captured(&self) -> Vec<CheckoutRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl CheckoutGateway for ScriptedGateway {
    async fn create_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let serial = self.requests.read().await.len() + 1;
        let session = CheckoutSession {
            id: format!("cs_test_{serial:03}"),
            url: Some(format!("https://checkout.test/pay/cs_test_{serial:03}")),
            payment_intent: None,
            payment_status: SessionPaymentStatus::Unpaid,
            amount_total: request.amount_minor,
            currency: request.currency.clone(),
            customer_email: Some(request.customer_email.clone()),
            metadata: request.metadata.clone(),
        };
        self.requests.write().await.push(request);
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| GatewayError::SessionNotFound(session_id.to_string()))
    }
}

/// Gateway that accepts sessions but never returns a redirect URL.
pub(super) struct NoRedirectGateway;

#[async_trait]
impl CheckoutGateway for NoRedirectGateway {
    async fn create_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        Ok(CheckoutSession {
            id: "cs_test_901".to_string(),
            url: None,
            payment_intent: None,
            payment_status: SessionPaymentStatus::Unpaid,
            amount_total: request.amount_minor,
            currency: request.currency,
            customer_email: Some(request.customer_email),
            metadata: request.metadata,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
        Err(GatewayError::SessionNotFound(session_id.to_string()))
    }
}

/// Gateway that never answers; exercises the timeout bound.
pub(super) struct HangingGateway;

#[async_trait]
impl CheckoutGateway for HangingGateway {
    async fn create_session(
        &self,
        _request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Err(GatewayError::Transport("unreachable".to_string()))
    }

    async fn retrieve_session(&self, _session_id: &str) -> Result<CheckoutSession, GatewayError> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Err(GatewayError::Transport("unreachable".to_string()))
    }
}
