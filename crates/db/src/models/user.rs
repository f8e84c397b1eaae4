//! Rows of the `users` table and their DTOs.

use assetrack_core::error::CoreError;
use assetrack_core::ports::UserRecord;
use assetrack_core::status::{StatusId, UserStatus};
use assetrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::lookup;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRow {
    pub id: DbId,
    pub name: String,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a user. Status defaults to `ACTIVE`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub status: Option<UserStatus>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = CoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserRecord {
            id: row.id,
            name: row.name,
            status: lookup("user_statuses", row.status_id, UserStatus::from_id)?,
        })
    }
}
