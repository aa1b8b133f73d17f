use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tutorhive::marketplace::applications::{
    application_router, ApplicationService, ApplicationStore,
};
use tutorhive::marketplace::payments::{
    payment_router, CheckoutGateway, PaymentService, PaymentStore,
};
use tutorhive::marketplace::tuitions::{tuition_router, TuitionService, TuitionStore};
use tutorhive::marketplace::users::{user_router, UserService, UserStore};

/// Marketplace routers merged with the operational endpoints. The payment
/// engine shares the application store with the application manager so a
/// settlement and an application update see the same records.
pub(crate) fn with_service_routes<T, A, P, G, U>(
    tuitions: Arc<TuitionService<T>>,
    applications: Arc<ApplicationService<A>>,
    payments: Arc<PaymentService<P, A, G>>,
    users: Arc<UserService<U>>,
) -> axum::Router
where
    T: TuitionStore + 'static,
    A: ApplicationStore + 'static,
    P: PaymentStore + 'static,
    G: CheckoutGateway + 'static,
    U: UserStore + 'static,
{
    tuition_router(tuitions)
        .merge(application_router(applications))
        .merge(payment_router(payments))
        .merge(user_router(users))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
