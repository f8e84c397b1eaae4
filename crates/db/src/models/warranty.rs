//! Rows of the append-only `warranty_history` table.

use assetrack_core::types::{Date, DbId, Timestamp};
use assetrack_core::warranty::WarrantyHistoryEntry;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `warranty_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WarrantyHistoryRow {
    pub id: DbId,
    pub asset_id: DbId,
    pub old_expiry_date: Option<Date>,
    pub new_expiry_date: Option<Date>,
    pub reason: String,
    pub changed_at: Timestamp,
}

impl From<WarrantyHistoryRow> for WarrantyHistoryEntry {
    fn from(row: WarrantyHistoryRow) -> Self {
        WarrantyHistoryEntry {
            id: row.id,
            asset_id: row.asset_id,
            old_expiry_date: row.old_expiry_date,
            new_expiry_date: row.new_expiry_date,
            reason: row.reason,
            changed_at: row.changed_at,
        }
    }
}
