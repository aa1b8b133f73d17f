use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::domain::{ApplicationId, ApplicationRequest};
use super::service::{ApplicationService, ApplicationServiceError};
use super::store::ApplicationStore;
use crate::marketplace::store::StoreError;
use crate::marketplace::tuitions::TuitionId;

/// Router exposing application intake and lifecycle endpoints.
pub fn application_router<S>(service: Arc<ApplicationService<S>>) -> Router
where
    S: ApplicationStore + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(apply_handler::<S>))
        .route("/api/v1/applications/applied", get(applied_handler::<S>))
        .route("/api/v1/applications/by-tutor", get(by_tutor_handler::<S>))
        .route(
            "/api/v1/applications/by-student",
            get(by_student_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id",
            patch(update_handler::<S>).delete(delete_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            patch(reject_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/record",
            get(fetch_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AppliedQuery {
    tutor_email: String,
    tuition_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmailQuery {
    email: String,
}

pub(crate) async fn apply_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    axum::Json(request): axum::Json<ApplicationRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    match service.apply(request).await {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error @ ApplicationServiceError::AlreadyApplied { .. }) => {
            let payload = json!({ "error": error.to_string(), "applied": true });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn applied_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Query(query): Query<AppliedQuery>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let tuition_id = TuitionId(query.tuition_id);
    match service.check_applied(&query.tutor_email, &tuition_id).await {
        Ok(applied) => (StatusCode::OK, axum::Json(json!({ "applied": applied }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn by_tutor_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Query(query): Query<EmailQuery>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    match service.list_by_tutor(&query.email).await {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn by_student_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Query(query): Query<EmailQuery>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    match service.list_by_student(&query.email).await {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    match service.get(&ApplicationId(application_id)).await {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
    axum::Json(patch): axum::Json<Map<String, Value>>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    match service
        .update_details(&ApplicationId(application_id), patch)
        .await
    {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    match service.delete(&ApplicationId(application_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    match service.reject(&ApplicationId(application_id)).await {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ApplicationServiceError) -> Response {
    let status = match &error {
        ApplicationServiceError::AlreadyApplied { .. } => StatusCode::CONFLICT,
        ApplicationServiceError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationServiceError::SettledRecordImmutable => StatusCode::CONFLICT,
        ApplicationServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::Store(StoreError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
