use assetrack_core::status::{StatusId, UserStatus};
use assetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UserRow};

const COLUMNS: &str = "id, name, status_id, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<UserRow, sqlx::Error> {
        let status = input.status.unwrap_or(UserStatus::Active);
        let query = format!(
            "INSERT INTO users (name, status_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(input.name.trim())
            .bind(status.id())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Activate or deactivate a user. Returns `None` if not found.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status_id: StatusId,
    ) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("UPDATE users SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(status_id)
            .fetch_optional(pool)
            .await
    }
}
