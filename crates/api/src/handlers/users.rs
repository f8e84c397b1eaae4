//! Handlers for the user directory.
//!
//! The directory is deliberately small: the ledger only needs a user's
//! existence and activity status.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use assetrack_core::error::CoreError;
use assetrack_core::ports::UserRecord;
use assetrack_core::status::UserStatus;
use assetrack_core::types::DbId;
use assetrack_db::models::user::CreateUser;
use assetrack_db::repositories::{NotificationRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use super::allocations::to_responses;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub status: Option<UserStatus>,
}

/// Request body for `PUT /users/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetUserStatusRequest {
    pub status: UserStatus,
}

/// Query parameters for `GET /users/{id}/allocations`.
#[derive(Debug, Default, Deserialize)]
pub struct UserAllocationParams {
    #[serde(default)]
    pub active_only: bool,
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let row = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            status: input.status,
        },
    )
    .await?;
    let user = UserRecord::try_from(row)?;

    tracing::info!(user_id = user.id, "User created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let user = load_user(&state, id).await?;

    Ok(Json(DataResponse { data: user }))
}

/// PUT /api/v1/users/{id}/status
///
/// Deactivated users keep their allocations but cannot receive new ones.
pub async fn set_user_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetUserStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let row = UserRepo::update_status(&state.pool, id, input.status.id())
        .await?
        .ok_or_else(|| CoreError::user_not_found(id))?;
    let user = UserRecord::try_from(row)?;

    tracing::info!(user_id = id, status = %user.status, "User status changed");

    Ok(Json(DataResponse { data: user }))
}

/// GET /api/v1/users/{id}/allocations?active_only=true
pub async fn user_allocations(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<UserAllocationParams>,
) -> AppResult<impl IntoResponse> {
    let allocations = state.ledger.user_allocations(id, params.active_only).await?;

    Ok(Json(DataResponse {
        data: to_responses(allocations),
    }))
}

/// GET /api/v1/users/{id}/notifications
///
/// Newest first.
pub async fn user_notifications(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_user(&state, id).await?;
    let notifications = NotificationRepo::list_by_user(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: notifications,
    }))
}

async fn load_user(state: &AppState, id: DbId) -> AppResult<UserRecord> {
    let row = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::user_not_found(id))?;
    Ok(UserRecord::try_from(row)?)
}
