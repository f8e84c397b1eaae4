//! Rows of the `assets` table.

use assetrack_core::asset::Asset;
use assetrack_core::error::CoreError;
use assetrack_core::status::{AssetCategory, AssetStatus, AssetType, StatusId};
use assetrack_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::lookup;

/// A row from the `assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetRow {
    pub id: DbId,
    pub tag: String,
    pub name: String,
    pub category_id: StatusId,
    pub asset_type_id: StatusId,
    pub status_id: StatusId,
    pub cost: f64,
    pub useful_life_years: i32,
    pub purchase_date: Date,
    pub warranty_expiry_date: Option<Date>,
    pub vendor_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<AssetRow> for Asset {
    type Error = CoreError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        Ok(Asset {
            id: row.id,
            tag: row.tag,
            name: row.name,
            category: lookup("asset_categories", row.category_id, AssetCategory::from_id)?,
            asset_type: lookup("asset_types", row.asset_type_id, AssetType::from_id)?,
            status: lookup("asset_statuses", row.status_id, AssetStatus::from_id)?,
            cost: row.cost,
            useful_life_years: row.useful_life_years,
            purchase_date: row.purchase_date,
            warranty_expiry_date: row.warranty_expiry_date,
            vendor_id: row.vendor_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
