use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{TuitionId, TuitionPatch, TuitionPosting, TuitionStatus};
use super::service::{TuitionService, TuitionServiceError};
use super::store::TuitionStore;
use crate::marketplace::store::StoreError;

/// Router exposing the posting lifecycle.
pub fn tuition_router<S>(service: Arc<TuitionService<S>>) -> Router
where
    S: TuitionStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/tuitions",
            post(create_handler::<S>).get(listings_handler::<S>),
        )
        .route("/api/v1/tuitions/posted-by", get(posted_by_handler::<S>))
        .route(
            "/api/v1/tuitions/:tuition_id",
            get(fetch_handler::<S>)
                .patch(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route(
            "/api/v1/tuitions/:tuition_id/status",
            patch(status_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingsQuery {
    status: Option<TuitionStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PosterQuery {
    email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    status: TuitionStatus,
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<TuitionService<S>>>,
    axum::Json(posting): axum::Json<TuitionPosting>,
) -> Response
where
    S: TuitionStore + 'static,
{
    match service.create(posting).await {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn listings_handler<S>(
    State(service): State<Arc<TuitionService<S>>>,
    Query(query): Query<ListingsQuery>,
) -> Response
where
    S: TuitionStore + 'static,
{
    match service.listings(query.status).await {
        Ok(listings) => (StatusCode::OK, axum::Json(listings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn posted_by_handler<S>(
    State(service): State<Arc<TuitionService<S>>>,
    Query(query): Query<PosterQuery>,
) -> Response
where
    S: TuitionStore + 'static,
{
    match service.posted_by(&query.email).await {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<S>(
    State(service): State<Arc<TuitionService<S>>>,
    Path(tuition_id): Path<String>,
) -> Response
where
    S: TuitionStore + 'static,
{
    match service.get(&TuitionId(tuition_id)).await {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<TuitionService<S>>>,
    Path(tuition_id): Path<String>,
    axum::Json(patch): axum::Json<TuitionPatch>,
) -> Response
where
    S: TuitionStore + 'static,
{
    match service.update_fields(&TuitionId(tuition_id), patch).await {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<TuitionService<S>>>,
    Path(tuition_id): Path<String>,
) -> Response
where
    S: TuitionStore + 'static,
{
    match service.delete(&TuitionId(tuition_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<S>(
    State(service): State<Arc<TuitionService<S>>>,
    Path(tuition_id): Path<String>,
    axum::Json(change): axum::Json<StatusChange>,
) -> Response
where
    S: TuitionStore + 'static,
{
    match service.set_status(&TuitionId(tuition_id), change.status).await {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: TuitionServiceError) -> Response {
    let status = match &error {
        TuitionServiceError::MissingPosterEmail => StatusCode::UNPROCESSABLE_ENTITY,
        TuitionServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        TuitionServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        TuitionServiceError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
