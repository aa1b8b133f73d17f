//! HTTP surface for checkout and reconciliation.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;

use super::domain::{CheckoutInfo, ReconcileOutcome};
use super::gateway::{CheckoutGateway, GatewayError};
use super::service::{PaymentService, PaymentServiceError};
use super::store::PaymentStore;
use crate::marketplace::applications::ApplicationStore;
use crate::marketplace::store::StoreError;

/// Router exposing checkout initiation, reconciliation, and payment lookups.
pub fn payment_router<P, A, G>(service: Arc<PaymentService<P, A, G>>) -> Router
where
    P: PaymentStore + 'static,
    A: ApplicationStore + 'static,
    G: CheckoutGateway + 'static,
{
    Router::new()
        .route(
            "/api/v1/payments/checkout-session",
            post(checkout_handler::<P, A, G>),
        )
        .route(
            "/api/v1/payments/reconcile",
            post(reconcile_handler::<P, A, G>),
        )
        .route(
            "/api/v1/payments/by-student",
            get(by_student_handler::<P, A, G>),
        )
        .route(
            "/api/v1/payments/by-tutor",
            get(by_tutor_handler::<P, A, G>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReconcileQuery {
    session_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmailQuery {
    email: String,
}

pub(crate) async fn checkout_handler<P, A, G>(
    State(service): State<Arc<PaymentService<P, A, G>>>,
    axum::Json(info): axum::Json<CheckoutInfo>,
) -> Response
where
    P: PaymentStore + 'static,
    A: ApplicationStore + 'static,
    G: CheckoutGateway + 'static,
{
    match service.initiate_checkout(info).await {
        Ok(handle) => (StatusCode::CREATED, axum::Json(handle)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reconcile_handler<P, A, G>(
    State(service): State<Arc<PaymentService<P, A, G>>>,
    Query(query): Query<ReconcileQuery>,
) -> Response
where
    P: PaymentStore + 'static,
    A: ApplicationStore + 'static,
    G: CheckoutGateway + 'static,
{
    match service.reconcile(&query.session_id).await {
        Ok(ReconcileOutcome::Reconciled { payment }) => (
            StatusCode::OK,
            axum::Json(json!({ "result": "reconciled", "payment": payment })),
        )
            .into_response(),
        Ok(ReconcileOutcome::AlreadyReconciled { payment }) => (
            StatusCode::OK,
            axum::Json(json!({ "result": "already_reconciled", "payment": payment })),
        )
            .into_response(),
        Ok(ReconcileOutcome::NotPaid) => (
            StatusCode::OK,
            axum::Json(json!({ "result": "not_paid" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn by_student_handler<P, A, G>(
    State(service): State<Arc<PaymentService<P, A, G>>>,
    Query(query): Query<EmailQuery>,
) -> Response
where
    P: PaymentStore + 'static,
    A: ApplicationStore + 'static,
    G: CheckoutGateway + 'static,
{
    match service.list_by_student(&query.email).await {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn by_tutor_handler<P, A, G>(
    State(service): State<Arc<PaymentService<P, A, G>>>,
    Query(query): Query<EmailQuery>,
) -> Response
where
    P: PaymentStore + 'static,
    A: ApplicationStore + 'static,
    G: CheckoutGateway + 'static,
{
    match service.list_by_tutor(&query.email).await {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: PaymentServiceError) -> Response {
    let status = match &error {
        PaymentServiceError::InvalidAmount(_) | PaymentServiceError::MissingField(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PaymentServiceError::ApplicationMissing { .. } => StatusCode::NOT_FOUND,
        PaymentServiceError::Gateway(GatewayError::SessionNotFound(_)) => StatusCode::NOT_FOUND,
        PaymentServiceError::Gateway(_) => StatusCode::BAD_GATEWAY,
        PaymentServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        PaymentServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        PaymentServiceError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
