use assetrack_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `service_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceLogRow {
    pub id: DbId,
    pub asset_id: DbId,
    pub log_date: Date,
    pub description: String,
    pub created_at: Timestamp,
}
