use assetrack_core::notification::ServiceLogEntry;
use assetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::service_log::ServiceLogRow;

const COLUMNS: &str = "id, asset_id, log_date, description, created_at";

pub struct ServiceLogRepo;

impl ServiceLogRepo {
    pub async fn create(pool: &PgPool, entry: &ServiceLogEntry) -> Result<ServiceLogRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO service_logs (asset_id, log_date, description) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceLogRow>(&query)
            .bind(entry.asset_id)
            .bind(entry.date)
            .bind(&entry.description)
            .fetch_one(pool)
            .await
    }

    /// Log lines for an asset in the order they were written.
    pub async fn list_by_asset(
        pool: &PgPool,
        asset_id: DbId,
    ) -> Result<Vec<ServiceLogRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM service_logs WHERE asset_id = $1 ORDER BY id");
        sqlx::query_as::<_, ServiceLogRow>(&query)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }
}
