//! Payments: checkout sessions against the external processor and the
//! idempotent reconciliation that turns a settled session into local state.

pub mod domain;
pub mod gateway;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    CheckoutHandle, CheckoutInfo, PaymentId, PaymentRecord, PaymentStatus, ReconcileOutcome,
    TransactionId,
};
pub use gateway::{
    CheckoutGateway, CheckoutMetadata, CheckoutRequest, CheckoutSession, GatewayError,
    SessionPaymentStatus,
};
pub use router::payment_router;
pub use service::{CheckoutConfig, PaymentService, PaymentServiceError};
pub use store::PaymentStore;
