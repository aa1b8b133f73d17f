//! Checkout initiation and idempotent reconciliation of settled sessions.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::domain::{
    CheckoutHandle, CheckoutInfo, PaymentId, PaymentRecord, PaymentStatus, ReconcileOutcome,
    TransactionId,
};
use super::gateway::{
    CheckoutGateway, CheckoutMetadata, CheckoutRequest, CheckoutSession, GatewayError,
    SessionPaymentStatus,
};
use super::store::PaymentStore;
use crate::marketplace::applications::{ApplicationId, ApplicationStatus, ApplicationStore};
use crate::marketplace::store::StoreError;
use crate::marketplace::tuitions::TuitionId;

static PAYMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_payment_id() -> PaymentId {
    let id = PAYMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PaymentId(format!("pay-{id:06}"))
}

/// Settings the engine needs to talk to the processor.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub currency: String,
    pub site_base_url: String,
    pub processor_timeout: Duration,
}

/// Drives checkout sessions and converts settled ones into durable local
/// state: the application flips to Paid and exactly one payment record is
/// written per processor transaction.
pub struct PaymentService<P, A, G> {
    payments: Arc<P>,
    applications: Arc<A>,
    gateway: Arc<G>,
    config: CheckoutConfig,
}

impl<P, A, G> PaymentService<P, A, G>
where
    P: PaymentStore + 'static,
    A: ApplicationStore + 'static,
    G: CheckoutGateway + 'static,
{
    pub fn new(
        payments: Arc<P>,
        applications: Arc<A>,
        gateway: Arc<G>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            payments,
            applications,
            gateway,
            config,
        }
    }

    /// Opens a checkout session with the processor and returns its redirect
    /// URL. Writes no local state; settlement happens in [`Self::reconcile`].
    pub async fn initiate_checkout(
        &self,
        info: CheckoutInfo,
    ) -> Result<CheckoutHandle, PaymentServiceError> {
        if info.student_email.trim().is_empty() {
            return Err(PaymentServiceError::MissingField("student_email"));
        }
        if info.tutor_email.trim().is_empty() {
            return Err(PaymentServiceError::MissingField("tutor_email"));
        }
        let amount_minor = minor_units(info.rate)?;

        let request = CheckoutRequest {
            amount_minor,
            currency: self.config.currency.clone(),
            customer_email: info.student_email.clone(),
            success_url: format!(
                "{}/payments/success?session_id={{CHECKOUT_SESSION_ID}}",
                self.config.site_base_url
            ),
            cancel_url: format!("{}/payments/cancelled", self.config.site_base_url),
            metadata: CheckoutMetadata {
                tuition_id: info.tuition_id.0.clone(),
                application_id: info.application_id.0.clone(),
                tutor_email: info.tutor_email.clone(),
                student_email: info.student_email.clone(),
            },
        };

        let session = self.bounded(self.gateway.create_session(request)).await?;
        let url = session.url.ok_or_else(|| {
            GatewayError::Rejected("checkout session carries no redirect url".to_string())
        })?;
        info!(
            session = %session.id,
            tuition = %info.tuition_id.0,
            application = %info.application_id.0,
            "checkout session created"
        );
        Ok(CheckoutHandle {
            session_id: session.id,
            url,
        })
    }

    /// Settles one session. Safe to call any number of times per
    /// transaction: the first paid sighting writes, every later call
    /// reports [`ReconcileOutcome::AlreadyReconciled`].
    pub async fn reconcile(
        &self,
        session_id: &str,
    ) -> Result<ReconcileOutcome, PaymentServiceError> {
        let session = self
            .bounded(self.gateway.retrieve_session(session_id))
            .await?;

        let Some(transaction_id) = session.payment_intent.clone() else {
            debug!(session = session_id, "session carries no transaction id");
            return Ok(ReconcileOutcome::NotPaid);
        };

        // Idempotency gate: one look at the natural key decides whether this
        // call settles, resumes an interrupted attempt, or is a duplicate.
        if let Some(existing) = self.payments.find_by_transaction(&transaction_id).await? {
            return match existing.status {
                PaymentStatus::Paid => Ok(ReconcileOutcome::AlreadyReconciled { payment: existing }),
                PaymentStatus::Recording => {
                    warn!(
                        transaction = %transaction_id.0,
                        payment = %existing.id.0,
                        "found interrupted settlement, completing it"
                    );
                    let payment = self.complete(existing).await?;
                    Ok(ReconcileOutcome::Reconciled { payment })
                }
            };
        }

        if session.payment_status != SessionPaymentStatus::Paid {
            debug!(
                session = session_id,
                status = ?session.payment_status,
                "session not paid"
            );
            return Ok(ReconcileOutcome::NotPaid);
        }

        // Claim the transaction before touching the application. The unique
        // transaction id elects a single winner under concurrent attempts.
        let claim = claim_record(&transaction_id, &session);
        let claimed = match self.payments.insert(claim).await {
            Ok(record) => record,
            Err(StoreError::Conflict) => {
                let winner = self
                    .payments
                    .find_by_transaction(&transaction_id)
                    .await?
                    .ok_or(StoreError::NotFound)?;
                return Ok(ReconcileOutcome::AlreadyReconciled { payment: winner });
            }
            Err(error) => return Err(error.into()),
        };

        let payment = self.complete(claimed).await?;
        info!(
            transaction = %transaction_id.0,
            payment = %payment.id.0,
            application = %payment.application_id.0,
            "payment reconciled"
        );
        Ok(ReconcileOutcome::Reconciled { payment })
    }

    pub async fn list_by_student(
        &self,
        email: &str,
    ) -> Result<Vec<PaymentRecord>, PaymentServiceError> {
        Ok(self.payments.list_by_student(email).await?)
    }

    pub async fn list_by_tutor(
        &self,
        email: &str,
    ) -> Result<Vec<PaymentRecord>, PaymentServiceError> {
        Ok(self.payments.list_by_tutor(email).await?)
    }

    /// Finishes a claimed settlement: application first, then the payment
    /// flips to Paid. A crash in between leaves the Recording claim, which
    /// the next reconcile call picks up and completes.
    async fn complete(&self, claim: PaymentRecord) -> Result<PaymentRecord, PaymentServiceError> {
        let Some(mut application) = self.applications.fetch(&claim.application_id).await? else {
            warn!(
                application = %claim.application_id.0,
                transaction = %claim.transaction_id.0,
                "application referenced by settled session is gone"
            );
            return Err(PaymentServiceError::ApplicationMissing {
                application_id: claim.application_id.clone(),
            });
        };
        if application.status != ApplicationStatus::Paid {
            application.status = ApplicationStatus::Paid;
            self.applications.replace(application).await?;
        }

        let mut payment = claim;
        payment.status = PaymentStatus::Paid;
        self.payments.replace(payment.clone()).await?;
        Ok(payment)
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        match tokio::time::timeout(self.config.processor_timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(GatewayError::Timeout),
        }
    }
}

/// Converts a major-unit rate into processor minor units, refusing amounts
/// the processor cannot represent.
fn minor_units(rate: Decimal) -> Result<i64, PaymentServiceError> {
    if rate <= Decimal::ZERO {
        return Err(PaymentServiceError::InvalidAmount(rate));
    }
    let scaled = rate * Decimal::ONE_HUNDRED;
    if !scaled.fract().is_zero() {
        return Err(PaymentServiceError::InvalidAmount(rate));
    }
    scaled
        .to_i64()
        .ok_or(PaymentServiceError::InvalidAmount(rate))
}

fn claim_record(transaction_id: &TransactionId, session: &CheckoutSession) -> PaymentRecord {
    PaymentRecord {
        id: next_payment_id(),
        transaction_id: transaction_id.clone(),
        tuition_id: TuitionId(session.metadata.tuition_id.clone()),
        application_id: ApplicationId(session.metadata.application_id.clone()),
        tutor_email: session.metadata.tutor_email.clone(),
        student_email: session.metadata.student_email.clone(),
        amount: Decimal::new(session.amount_total, 2).normalize(),
        currency: session.currency.clone(),
        status: PaymentStatus::Recording,
        paid_at: Utc::now(),
    }
}

#[derive(Debug, Error)]
pub enum PaymentServiceError {
    #[error("amount {0} cannot be charged")]
    InvalidAmount(Decimal),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("application {} referenced by the session no longer exists", application_id.0)]
    ApplicationMissing { application_id: ApplicationId },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
