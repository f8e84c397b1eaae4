//! Handlers for the allocation ledger and group allocation.
//!
//! Every mutation goes through [`AllocationLedger`](assetrack_core::ledger::AllocationLedger),
//! which keeps the asset status and the active allocation row in step.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use assetrack_core::allocation::{Allocation, ReturnStatus};
use assetrack_core::types::{Date, DbId};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum length of free-text remarks.
const MAX_REMARKS_LEN: u64 = 1000;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /assets/{id}/allocate`. The date defaults to today.
#[derive(Debug, Deserialize, Validate)]
pub struct AllocateRequest {
    #[validate(range(min = 1))]
    pub user_id: DbId,
    pub allocated_date: Option<Date>,
    #[validate(length(max = MAX_REMARKS_LEN))]
    pub remarks: Option<String>,
}

/// Request body for `POST /assets/{id}/return`. The date defaults to today.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReturnRequestBody {
    pub returned_date: Option<Date>,
    #[validate(length(max = MAX_REMARKS_LEN))]
    pub remarks: Option<String>,
}

/// Request body for `POST /assets/{id}/return-request`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RequestReturnBody {
    #[validate(length(max = MAX_REMARKS_LEN))]
    pub remarks: Option<String>,
}

/// Request body for `POST /assets/{id}/return-acknowledgement`.
#[derive(Debug, Deserialize, Validate)]
pub struct AcknowledgeReturnRequest {
    #[validate(range(min = 1))]
    pub user_id: DbId,
}

/// Request body for `POST /groups/allocate`.
#[derive(Debug, Deserialize, Validate)]
pub struct GroupAllocateRequest {
    #[validate(length(min = 1, max = 200))]
    pub group_name: String,
    #[validate(range(min = 1))]
    pub user_id: DbId,
    #[validate(length(max = MAX_REMARKS_LEN))]
    pub remarks: Option<String>,
}

/// An allocation with its derived legacy return status.
#[derive(Debug, Serialize)]
pub struct AllocationResponse {
    #[serde(flatten)]
    pub allocation: Allocation,
    pub return_status: ReturnStatus,
}

impl From<Allocation> for AllocationResponse {
    fn from(allocation: Allocation) -> Self {
        let return_status = allocation.return_status();
        Self {
            allocation,
            return_status,
        }
    }
}

pub(crate) fn to_responses(allocations: Vec<Allocation>) -> Vec<AllocationResponse> {
    allocations.into_iter().map(AllocationResponse::from).collect()
}

// ---------------------------------------------------------------------------
// Ledger mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/assets/{id}/allocate
pub async fn allocate(
    State(state): State<AppState>,
    Path(asset_id): Path<DbId>,
    Json(input): Json<AllocateRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let date = input.allocated_date.unwrap_or_else(|| state.ledger.today());
    let allocation = state
        .ledger
        .allocate(asset_id, input.user_id, date, input.remarks)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AllocationResponse::from(allocation),
        }),
    ))
}

/// POST /api/v1/assets/{id}/return
///
/// Closes the active allocation from any handshake state.
pub async fn return_asset(
    State(state): State<AppState>,
    Path(asset_id): Path<DbId>,
    body: Option<Json<ReturnRequestBody>>,
) -> AppResult<impl IntoResponse> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    input.validate()?;
    let date = input.returned_date.unwrap_or_else(|| state.ledger.today());
    let allocation = state
        .ledger
        .return_asset(asset_id, date, input.remarks)
        .await?;

    Ok(Json(DataResponse {
        data: AllocationResponse::from(allocation),
    }))
}

/// POST /api/v1/assets/{id}/return-request
pub async fn request_return(
    State(state): State<AppState>,
    Path(asset_id): Path<DbId>,
    body: Option<Json<RequestReturnBody>>,
) -> AppResult<impl IntoResponse> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    input.validate()?;
    let allocation = state.ledger.request_return(asset_id, input.remarks).await?;

    Ok(Json(DataResponse {
        data: AllocationResponse::from(allocation),
    }))
}

/// POST /api/v1/assets/{id}/return-acknowledgement
///
/// Only the current holder may acknowledge.
pub async fn acknowledge_return(
    State(state): State<AppState>,
    Path(asset_id): Path<DbId>,
    Json(input): Json<AcknowledgeReturnRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let allocation = state
        .ledger
        .acknowledge_return(asset_id, input.user_id)
        .await?;

    Ok(Json(DataResponse {
        data: AllocationResponse::from(allocation),
    }))
}

/// POST /api/v1/groups/allocate
///
/// Allocates the lowest-id available asset whose name equals the group name.
pub async fn allocate_from_group(
    State(state): State<AppState>,
    Json(input): Json<GroupAllocateRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let allocation = state
        .groups
        .allocate_from_group(&input.group_name, input.user_id, input.remarks)
        .await?;

    tracing::info!(
        group = %input.group_name,
        asset_id = allocation.asset_id,
        user_id = allocation.user_id,
        "Group allocation completed"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AllocationResponse::from(allocation),
        }),
    ))
}

// ---------------------------------------------------------------------------
// Ledger queries
// ---------------------------------------------------------------------------

/// GET /api/v1/assets/{id}/allocation
///
/// The active allocation, or `null` when the asset is not allocated.
pub async fn current_allocation(
    State(state): State<AppState>,
    Path(asset_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let current = state.ledger.current_allocation(asset_id).await?;

    Ok(Json(DataResponse {
        data: current.map(AllocationResponse::from),
    }))
}

/// GET /api/v1/assets/{id}/allocations
pub async fn allocation_history(
    State(state): State<AppState>,
    Path(asset_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let history = state.ledger.allocation_history(asset_id).await?;

    Ok(Json(DataResponse {
        data: to_responses(history),
    }))
}
