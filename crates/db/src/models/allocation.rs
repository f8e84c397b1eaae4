//! Rows of the `asset_allocations` table.

use assetrack_core::allocation::Allocation;
use assetrack_core::error::CoreError;
use assetrack_core::status::{AllocationState, StatusId};
use assetrack_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::lookup;

/// A row from the `asset_allocations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AllocationRow {
    pub id: DbId,
    pub asset_id: DbId,
    pub user_id: DbId,
    pub allocated_date: Date,
    pub returned_date: Option<Date>,
    pub remarks: Option<String>,
    pub return_request_date: Option<Timestamp>,
    pub return_request_remarks: Option<String>,
    pub state_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<AllocationRow> for Allocation {
    type Error = CoreError;

    fn try_from(row: AllocationRow) -> Result<Self, Self::Error> {
        Ok(Allocation {
            id: row.id,
            asset_id: row.asset_id,
            user_id: row.user_id,
            allocated_date: row.allocated_date,
            returned_date: row.returned_date,
            remarks: row.remarks,
            return_request_date: row.return_request_date,
            return_request_remarks: row.return_request_remarks,
            state: lookup("allocation_states", row.state_id, AllocationState::from_id)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
