//! Checkout client for the Stripe REST API.

use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tutorhive::marketplace::payments::{
    CheckoutMetadata, CheckoutRequest, CheckoutSession, GatewayError, SessionPaymentStatus,
    TransactionId,
};

const STRIPE_API_BASE: &str = "https://api.stripe.com";
const CHECKOUT_PRODUCT_NAME: &str = "Tuition fee";

/// Thin client over Stripe's checkout session endpoints. Session state and
/// idempotency live with the reconciliation engine, not here.
pub(crate) struct StripeCheckoutClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl StripeCheckoutClient {
    pub(crate) fn new(secret_key: String, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            secret_key,
            base_url: STRIPE_API_BASE.to_string(),
        }
    }

    pub(crate) async fn create_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);
        let form: Vec<(&str, String)> = vec![
            ("mode", "payment".to_string()),
            ("success_url", request.success_url),
            ("cancel_url", request.cancel_url),
            ("customer_email", request.customer_email),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", request.currency),
            (
                "line_items[0][price_data][unit_amount]",
                request.amount_minor.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                CHECKOUT_PRODUCT_NAME.to_string(),
            ),
            ("metadata[tuition_id]", request.metadata.tuition_id),
            ("metadata[application_id]", request.metadata.application_id),
            ("metadata[tutor_email]", request.metadata.tutor_email),
            ("metadata[student_email]", request.metadata.student_email),
        ];

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(rejection_from_response(response).await);
        }

        let payload = response
            .json::<SessionPayload>()
            .await
            .map_err(|err| GatewayError::InvalidResponse(err.to_string()))?;
        payload.into_session()
    }

    pub(crate) async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, GatewayError> {
        let url = format!("{}/v1/checkout/sessions/{session_id}", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::SessionNotFound(session_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(rejection_from_response(response).await);
        }

        let payload = response
            .json::<SessionPayload>()
            .await
            .map_err(|err| GatewayError::InvalidResponse(err.to_string()))?;
        payload.into_session()
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(err.to_string())
    }
}

async fn rejection_from_response(response: reqwest::Response) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorPayload>(&body)
        .ok()
        .and_then(|payload| payload.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| format!("status {}", status.as_u16()));
    GatewayError::Rejected(message)
}

/// Stripe error envelope: `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Subset of the session object Stripe returns; everything else is dropped.
#[derive(Debug, Deserialize)]
struct SessionPayload {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    payment_intent: Option<String>,
    payment_status: SessionPaymentStatus,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl SessionPayload {
    fn into_session(mut self) -> Result<CheckoutSession, GatewayError> {
        let metadata = CheckoutMetadata {
            tuition_id: take_metadata(&mut self.metadata, "tuition_id")?,
            application_id: take_metadata(&mut self.metadata, "application_id")?,
            tutor_email: take_metadata(&mut self.metadata, "tutor_email")?,
            student_email: take_metadata(&mut self.metadata, "student_email")?,
        };
        Ok(CheckoutSession {
            id: self.id,
            url: self.url,
            payment_intent: self.payment_intent.map(TransactionId),
            payment_status: self.payment_status,
            amount_total: self.amount_total.unwrap_or(0),
            currency: self.currency.unwrap_or_default(),
            customer_email: self.customer_email,
            metadata,
        })
    }
}

fn take_metadata(
    metadata: &mut HashMap<String, String>,
    key: &str,
) -> Result<String, GatewayError> {
    metadata
        .remove(key)
        .ok_or_else(|| GatewayError::InvalidResponse(format!("session metadata is missing {key}")))
}
