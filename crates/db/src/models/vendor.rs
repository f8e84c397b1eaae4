use assetrack_core::ports::VendorRecord;
use assetrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `vendors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VendorRow {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a vendor.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVendor {
    pub name: String,
}

impl From<VendorRow> for VendorRecord {
    fn from(row: VendorRow) -> Self {
        VendorRecord {
            id: row.id,
            name: row.name,
        }
    }
}
