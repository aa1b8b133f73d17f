//! Seam to the external checkout processor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::TransactionId;

/// Attribution carried through the processor and handed back on retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutMetadata {
    pub tuition_id: String,
    pub application_id: String,
    pub tutor_email: String,
    pub student_email: String,
}

/// Session creation request. `amount_minor` is in processor minor units.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: CheckoutMetadata,
}

/// Payment state the processor reports on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
}

/// Processor-side view of a checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    /// Redirect target; present while the session accepts payment.
    pub url: Option<String>,
    /// Absent until the processor has attached a charge attempt.
    pub payment_intent: Option<TransactionId>,
    pub payment_status: SessionPaymentStatus,
    /// Total in processor minor units.
    pub amount_total: i64,
    pub currency: String,
    pub customer_email: Option<String>,
    pub metadata: CheckoutMetadata,
}

/// Checkout processor operations the engine depends on.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError>;
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("checkout session {0} not found")]
    SessionNotFound(String),
    #[error("processor rejected the request: {0}")]
    Rejected(String),
    #[error("processor unreachable: {0}")]
    Transport(String),
    #[error("processor response could not be decoded: {0}")]
    InvalidResponse(String),
    #[error("processor call timed out")]
    Timeout,
}
