//! Handlers for the vendor directory.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use assetrack_db::models::vendor::CreateVendor;
use assetrack_db::repositories::VendorRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /vendors`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVendorRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

/// GET /api/v1/vendors
pub async fn list_vendors(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let vendors = VendorRepo::list(&state.pool).await?;

    Ok(Json(DataResponse { data: vendors }))
}

/// POST /api/v1/vendors
///
/// Vendor names are unique; a duplicate yields 409.
pub async fn create_vendor(
    State(state): State<AppState>,
    Json(input): Json<CreateVendorRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let vendor = VendorRepo::create(
        &state.pool,
        &CreateVendor {
            name: input.name.trim().to_string(),
        },
    )
    .await?;

    tracing::info!(vendor_id = vendor.id, "Vendor created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: vendor })))
}
