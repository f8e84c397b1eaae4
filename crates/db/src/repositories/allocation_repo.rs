//! Repository for the `asset_allocations` table.
//!
//! Opening and closing an allocation each write the allocation row and the
//! asset status in one transaction. The asset status write is a conditional
//! `UPDATE`, so of two concurrent openers exactly one sees its row change.

use assetrack_core::allocation::{NewAllocation, ReturnRequest};
use assetrack_core::status::{AllocationState, AssetStatus, StatusId};
use assetrack_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::allocation::AllocationRow;

/// Column list for `asset_allocations` queries.
const COLUMNS: &str = "\
    id, asset_id, user_id, allocated_date, returned_date, remarks, \
    return_request_date, return_request_remarks, state_id, \
    created_at, updated_at";

/// Ordering shared by every list query: most recent allocation first.
const NEWEST_FIRST: &str = "ORDER BY allocated_date DESC, id DESC";

/// Outcome of [`AllocationRepo::open`].
#[derive(Debug, Clone)]
pub enum OpenOutcome {
    Opened(AllocationRow),
    AssetMissing,
    /// The asset exists but was not `AVAILABLE`; carries its current status id.
    Unavailable(StatusId),
}

/// Provides the allocation lifecycle writes and reads.
pub struct AllocationRepo;

impl AllocationRepo {
    /// Move the asset `AVAILABLE -> ALLOCATED` and insert an active row.
    pub async fn open(pool: &PgPool, input: &NewAllocation) -> Result<OpenOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE assets SET status_id = $2 WHERE id = $1 AND status_id = $3",
        )
        .bind(input.asset_id)
        .bind(AssetStatus::Allocated.id())
        .bind(AssetStatus::Available.id())
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            let current: Option<(StatusId,)> =
                sqlx::query_as("SELECT status_id FROM assets WHERE id = $1")
                    .bind(input.asset_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Ok(match current {
                Some((status_id,)) => OpenOutcome::Unavailable(status_id),
                None => OpenOutcome::AssetMissing,
            });
        }

        let query = format!(
            "INSERT INTO asset_allocations (asset_id, user_id, allocated_date, remarks, state_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, AllocationRow>(&query)
            .bind(input.asset_id)
            .bind(input.user_id)
            .bind(input.allocated_date)
            .bind(input.remarks.as_deref())
            .bind(AllocationState::Active.id())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(OpenOutcome::Opened(row))
    }

    /// Close an active row and make its asset `AVAILABLE` again. An asset
    /// moved out of `ALLOCATED` by an override keeps its status.
    ///
    /// Returns `None` if the row does not exist or was already returned.
    pub async fn close(
        pool: &PgPool,
        allocation_id: DbId,
        returned_date: Date,
        remarks: Option<&str>,
    ) -> Result<Option<AllocationRow>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE asset_allocations SET \
                returned_date = $2, \
                remarks = $3, \
                state_id = $4 \
             WHERE id = $1 AND returned_date IS NULL \
             RETURNING {COLUMNS}"
        );
        let Some(row) = sqlx::query_as::<_, AllocationRow>(&query)
            .bind(allocation_id)
            .bind(returned_date)
            .bind(remarks)
            .bind(AllocationState::Returned.id())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query("UPDATE assets SET status_id = $2 WHERE id = $1 AND status_id = $3")
            .bind(row.asset_id)
            .bind(AssetStatus::Available.id())
            .bind(AssetStatus::Allocated.id())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(row))
    }

    /// Move an active row from `expected` to `next`, optionally recording a
    /// return request. Returns `None` if the row is no longer in `expected`.
    pub async fn apply_handshake(
        pool: &PgPool,
        allocation_id: DbId,
        expected: AllocationState,
        next: AllocationState,
        request: Option<&ReturnRequest>,
    ) -> Result<Option<AllocationRow>, sqlx::Error> {
        match request {
            Some(request) => {
                let query = format!(
                    "UPDATE asset_allocations SET \
                        state_id = $3, \
                        return_request_date = $4, \
                        return_request_remarks = $5 \
                     WHERE id = $1 AND state_id = $2 AND returned_date IS NULL \
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, AllocationRow>(&query)
                    .bind(allocation_id)
                    .bind(expected.id())
                    .bind(next.id())
                    .bind(request.requested_at)
                    .bind(request.remarks.as_deref())
                    .fetch_optional(pool)
                    .await
            }
            None => {
                let query = format!(
                    "UPDATE asset_allocations SET state_id = $3 \
                     WHERE id = $1 AND state_id = $2 AND returned_date IS NULL \
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, AllocationRow>(&query)
                    .bind(allocation_id)
                    .bind(expected.id())
                    .bind(next.id())
                    .fetch_optional(pool)
                    .await
            }
        }
    }

    /// The active row for an asset, if any.
    pub async fn find_active(
        pool: &PgPool,
        asset_id: DbId,
    ) -> Result<Option<AllocationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_allocations \
             WHERE asset_id = $1 AND returned_date IS NULL"
        );
        sqlx::query_as::<_, AllocationRow>(&query)
            .bind(asset_id)
            .fetch_optional(pool)
            .await
    }

    /// Every row for an asset, most recent allocation first.
    pub async fn list_by_asset(
        pool: &PgPool,
        asset_id: DbId,
    ) -> Result<Vec<AllocationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_allocations WHERE asset_id = $1 {NEWEST_FIRST}"
        );
        sqlx::query_as::<_, AllocationRow>(&query)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }

    /// Rows held by a user, most recent allocation first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        active_only: bool,
    ) -> Result<Vec<AllocationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_allocations \
             WHERE user_id = $1 AND (NOT $2 OR returned_date IS NULL) \
             {NEWEST_FIRST}"
        );
        sqlx::query_as::<_, AllocationRow>(&query)
            .bind(user_id)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }
}
