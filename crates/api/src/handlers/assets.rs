//! Handlers for the asset registry.
//!
//! Provides endpoints for registration, lookup, search, descriptive updates,
//! administrative status overrides, deletion, and the warranty audit trail.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use assetrack_core::asset::{AssetUpdate, NewAsset};
use assetrack_core::filter::AssetFilter;
use assetrack_core::status::{AssetCategory, AssetStatus, AssetType};
use assetrack_core::types::DbId;
use serde::Deserialize;
use validator::Validate;

use super::parse_label;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /assets`.
///
/// Lookup labels are matched case-insensitively. `group` selects assets
/// whose name equals the group name exactly; `name` is a substring match.
#[derive(Debug, Default, Deserialize)]
pub struct AssetSearchParams {
    pub category: Option<String>,
    pub asset_type: Option<String>,
    pub status: Option<String>,
    pub name: Option<String>,
    pub group: Option<String>,
    pub vendor_id: Option<DbId>,
}

impl AssetSearchParams {
    fn into_filter(self) -> AppResult<AssetFilter> {
        let mut filter = AssetFilter::new();
        if let Some(category) =
            parse_label("category", self.category.as_deref(), AssetCategory::parse)?
        {
            filter = filter.category(category);
        }
        if let Some(asset_type) =
            parse_label("asset_type", self.asset_type.as_deref(), AssetType::parse)?
        {
            filter = filter.asset_type(asset_type);
        }
        if let Some(status) = parse_label("status", self.status.as_deref(), AssetStatus::parse)? {
            filter = filter.status(status);
        }
        if let Some(name) = self.name.filter(|n| !n.trim().is_empty()) {
            filter = filter.name_contains(name.trim());
        }
        if let Some(group) = self.group.filter(|g| !g.trim().is_empty()) {
            filter = filter.name_equals(group.trim());
        }
        if let Some(vendor_id) = self.vendor_id {
            filter = filter.vendor(vendor_id);
        }
        Ok(filter)
    }
}

/// Query parameters for `PUT /assets/{id}`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateReasonParams {
    #[validate(length(min = 1, max = 500))]
    pub reason: Option<String>,
}

/// Request body for `PUT /assets/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: AssetStatus,
}

// ---------------------------------------------------------------------------
// Asset CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/assets
///
/// Search assets with optional filters, ordered by id.
pub async fn search_assets(
    State(state): State<AppState>,
    Query(params): Query<AssetSearchParams>,
) -> AppResult<impl IntoResponse> {
    let filter = params.into_filter()?;
    let assets = state.registry.search(&filter).await?;

    Ok(Json(DataResponse { data: assets }))
}

/// POST /api/v1/assets
///
/// Register a new asset. It starts `AVAILABLE`.
pub async fn create_asset(
    State(state): State<AppState>,
    Json(input): Json<NewAsset>,
) -> AppResult<impl IntoResponse> {
    let asset = state.registry.create(&input).await?;

    tracing::info!(asset_id = asset.id, tag = %asset.tag, "Asset registered");

    Ok((StatusCode::CREATED, Json(DataResponse { data: asset })))
}

/// GET /api/v1/assets/tag/{tag}
pub async fn get_asset_by_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> AppResult<impl IntoResponse> {
    let asset = state.registry.get_by_tag(&tag).await?;

    Ok(Json(DataResponse { data: asset }))
}

/// GET /api/v1/assets/{id}
///
/// Returns the asset with its vendor name and current book value.
pub async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let view = state.registry.describe(id).await?;

    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/assets/{id}
///
/// Partial update of descriptive fields. `?reason=` is recorded in the
/// warranty audit trail when the warranty date changes.
pub async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<UpdateReasonParams>,
    Json(input): Json<AssetUpdate>,
) -> AppResult<impl IntoResponse> {
    params.validate()?;
    let asset = state
        .registry
        .update(id, &input, params.reason.as_deref())
        .await?;

    Ok(Json(DataResponse { data: asset }))
}

/// DELETE /api/v1/assets/{id}
///
/// Refused while the asset has any allocation history.
pub async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.registry.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/assets/{id}/status
///
/// Administrative override (maintenance, retirement, loss). Allocation
/// status moves only through the allocation endpoints.
pub async fn set_asset_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let asset = state.registry.set_status(id, input.status).await?;

    Ok(Json(DataResponse { data: asset }))
}

/// GET /api/v1/assets/{id}/warranty-history
///
/// Warranty audit rows, newest first.
pub async fn warranty_history(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let history = state.registry.warranty_history(id).await?;

    Ok(Json(DataResponse { data: history }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use assert_matches::assert_matches;

    #[test]
    fn search_params_parse_labels_case_insensitively() {
        let params = AssetSearchParams {
            category: Some("hardware".into()),
            status: Some(" Available ".into()),
            group: Some(" Dell Latitude ".into()),
            ..Default::default()
        };
        let filter = params.into_filter().unwrap();
        let expected = AssetFilter::new()
            .category(AssetCategory::Hardware)
            .status(AssetStatus::Available)
            .name_equals("Dell Latitude");
        assert_eq!(filter, expected);
    }

    #[test]
    fn unknown_label_is_a_bad_request() {
        let params = AssetSearchParams {
            status: Some("BROKEN".into()),
            ..Default::default()
        };
        assert_matches!(params.into_filter(), Err(AppError::BadRequest(msg)) if msg.contains("BROKEN"));
    }

    #[test]
    fn blank_filters_are_ignored() {
        let params = AssetSearchParams {
            name: Some("   ".into()),
            category: Some("".into()),
            ..Default::default()
        };
        assert_eq!(params.into_filter().unwrap(), AssetFilter::new());
    }
}
