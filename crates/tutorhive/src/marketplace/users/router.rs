use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde_json::json;

use super::domain::{SignupDraft, SignupOutcome, UserId};
use super::service::{AccountPatch, UserService, UserServiceError};
use super::store::UserStore;
use crate::marketplace::store::StoreError;

/// Router exposing signup, account management, and the tutor directory.
pub fn user_router<S>(service: Arc<UserService<S>>) -> Router
where
    S: UserStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/users",
            post(signup_handler::<S>).get(list_handler::<S>),
        )
        .route("/api/v1/users/by-email/:email", get(by_email_handler::<S>))
        .route(
            "/api/v1/users/:user_id",
            patch(update_handler::<S>).delete(delete_handler::<S>),
        )
        .route("/api/v1/tutors", get(tutors_handler::<S>))
        .with_state(service)
}

pub(crate) async fn signup_handler<S>(
    State(service): State<Arc<UserService<S>>>,
    axum::Json(draft): axum::Json<SignupDraft>,
) -> Response
where
    S: UserStore + 'static,
{
    match service.create(draft).await {
        Ok(SignupOutcome::Created(account)) => {
            (StatusCode::CREATED, axum::Json(account)).into_response()
        }
        Ok(SignupOutcome::AlreadyRegistered(account)) => (
            StatusCode::OK,
            axum::Json(json!({ "message": "already registered", "user": account })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<S>(State(service): State<Arc<UserService<S>>>) -> Response
where
    S: UserStore + 'static,
{
    match service.list().await {
        Ok(accounts) => (StatusCode::OK, axum::Json(accounts)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn by_email_handler<S>(
    State(service): State<Arc<UserService<S>>>,
    Path(email): Path<String>,
) -> Response
where
    S: UserStore + 'static,
{
    match service.get_by_email(&email).await {
        Ok(account) => (StatusCode::OK, axum::Json(account)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<UserService<S>>>,
    Path(user_id): Path<String>,
    axum::Json(patch): axum::Json<AccountPatch>,
) -> Response
where
    S: UserStore + 'static,
{
    match service.update(&UserId(user_id), patch).await {
        Ok(account) => (StatusCode::OK, axum::Json(account)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<UserService<S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: UserStore + 'static,
{
    match service.delete(&UserId(user_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn tutors_handler<S>(State(service): State<Arc<UserService<S>>>) -> Response
where
    S: UserStore + 'static,
{
    match service.list_tutors().await {
        Ok(cards) => (StatusCode::OK, axum::Json(cards)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: UserServiceError) -> Response {
    let status = match &error {
        UserServiceError::MissingEmail => StatusCode::UNPROCESSABLE_ENTITY,
        UserServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        UserServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        UserServiceError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
