//! Repository for the append-only `warranty_history` table.

use assetrack_core::types::DbId;
use assetrack_core::warranty::WarrantyChange;
use sqlx::PgPool;

use crate::models::warranty::WarrantyHistoryRow;

/// Column list for `warranty_history` queries.
const COLUMNS: &str = "id, asset_id, old_expiry_date, new_expiry_date, reason, changed_at";

/// Appends and lists warranty audit rows. Rows are never updated or deleted.
pub struct WarrantyHistoryRepo;

impl WarrantyHistoryRepo {
    /// Append one audit row stamped with the database clock.
    pub async fn create(
        pool: &PgPool,
        change: &WarrantyChange,
    ) -> Result<WarrantyHistoryRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO warranty_history (asset_id, old_expiry_date, new_expiry_date, reason) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarrantyHistoryRow>(&query)
            .bind(change.asset_id)
            .bind(change.old_expiry_date)
            .bind(change.new_expiry_date)
            .bind(&change.reason)
            .fetch_one(pool)
            .await
    }

    /// Audit rows for an asset, newest first.
    pub async fn list_by_asset(
        pool: &PgPool,
        asset_id: DbId,
    ) -> Result<Vec<WarrantyHistoryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM warranty_history \
             WHERE asset_id = $1 \
             ORDER BY changed_at DESC, id DESC"
        );
        sqlx::query_as::<_, WarrantyHistoryRow>(&query)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }
}
