//! Payment records, checkout inputs, and reconciliation outcomes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::marketplace::applications::ApplicationId;
use crate::marketplace::tuitions::TuitionId;

/// Identifier for a locally recorded payment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(pub String);

/// Transaction identifier issued by the processor; the natural key that
/// deduplicates reconciliation attempts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

/// Lifecycle of a local payment record.
///
/// `Recording` is the claim held while the application update and the final
/// payment write are in flight; `Paid` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Recording,
    Paid,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Recording => "recording",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// Durable record of a settled checkout, written only by the
/// reconciliation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub transaction_id: TransactionId,
    pub tuition_id: TuitionId,
    pub application_id: ApplicationId,
    pub tutor_email: String,
    pub student_email: String,
    /// Major currency units, converted back from the processor total.
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
}

/// Everything checkout needs to price and attribute a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutInfo {
    pub tuition_id: TuitionId,
    pub application_id: ApplicationId,
    pub tutor_email: String,
    pub student_email: String,
    /// Monthly rate in major currency units.
    pub rate: Decimal,
}

/// Redirect handle returned once the processor accepts a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutHandle {
    pub session_id: String,
    pub url: String,
}

/// Result of reconciling one checkout session.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// This call performed the settlement writes.
    Reconciled { payment: PaymentRecord },
    /// An earlier call already settled this transaction; nothing written.
    AlreadyReconciled { payment: PaymentRecord },
    /// The processor reports the session unpaid; nothing written.
    NotPaid,
}
