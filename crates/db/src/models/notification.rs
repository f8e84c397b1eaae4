use assetrack_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table. `kind` holds the notification
/// type label (`ASSET_ALLOCATED`, `WARNING`, ...).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationRow {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub related_issue_id: Option<DbId>,
    pub related_asset_id: Option<DbId>,
    pub is_read: bool,
    pub created_at: Timestamp,
}
