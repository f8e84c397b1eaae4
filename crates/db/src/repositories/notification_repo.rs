use assetrack_core::notification::NotificationRequest;
use assetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::NotificationRow;

const COLUMNS: &str = "\
    id, user_id, title, message, kind, related_issue_id, related_asset_id, \
    is_read, created_at";

pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(
        pool: &PgPool,
        request: &NotificationRequest,
    ) -> Result<NotificationRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications \
                (user_id, title, message, kind, related_issue_id, related_asset_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(request.user_id)
            .bind(&request.title)
            .bind(&request.message)
            .bind(request.kind.as_str())
            .bind(request.related_issue_id)
            .bind(request.related_asset_id)
            .fetch_one(pool)
            .await
    }

    /// Notifications addressed to a user, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<NotificationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications WHERE user_id = $1 ORDER BY id DESC"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
