//! Repository for the `assets` table.

use assetrack_core::asset::{AssetUpdate, NewAsset};
use assetrack_core::filter::AssetFilter;
use assetrack_core::status::{AssetStatus, StatusId};
use assetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::asset::AssetRow;

/// Column list for `assets` queries.
const COLUMNS: &str = "\
    id, tag, name, category_id, asset_type_id, status_id, \
    cost, useful_life_years, purchase_date, warranty_expiry_date, \
    vendor_id, created_at, updated_at";

/// Outcome of [`AssetRepo::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetDeletion {
    Deleted,
    NotFound,
    Allocated,
    HasAllocationHistory,
    HasWarrantyHistory,
}

/// Provides CRUD operations for assets.
pub struct AssetRepo;

impl AssetRepo {
    /// Insert a new asset in `AVAILABLE` status.
    pub async fn create(pool: &PgPool, input: &NewAsset) -> Result<AssetRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (\
                tag, name, category_id, asset_type_id, status_id, \
                cost, useful_life_years, purchase_date, warranty_expiry_date, vendor_id\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(input.tag.trim())
            .bind(input.name.trim())
            .bind(input.category.id())
            .bind(input.asset_type.id())
            .bind(AssetStatus::Available.id())
            .bind(input.cost)
            .bind(input.useful_life_years)
            .bind(input.purchase_date)
            .bind(input.warranty_expiry_date)
            .bind(input.vendor_id)
            .fetch_one(pool)
            .await
    }

    /// Find an asset by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1");
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an asset by its tag.
    pub async fn find_by_tag(pool: &PgPool, tag: &str) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE tag = $1");
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(tag.trim())
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial update, returning the row before and after.
    ///
    /// The previous row is read under `FOR UPDATE` in the same transaction, so
    /// the pair always describes a single change. Returns `None` if not found.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &AssetUpdate,
    ) -> Result<Option<(AssetRow, AssetRow)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM assets WHERE id = $1 FOR UPDATE");
        let Some(before) = sqlx::query_as::<_, AssetRow>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        // Doubly optional columns carry an explicit "set" flag so they can be cleared.
        let query = format!(
            "UPDATE assets SET \
                name = COALESCE($2, name), \
                category_id = COALESCE($3, category_id), \
                asset_type_id = COALESCE($4, asset_type_id), \
                cost = COALESCE($5, cost), \
                useful_life_years = COALESCE($6, useful_life_years), \
                purchase_date = COALESCE($7, purchase_date), \
                warranty_expiry_date = CASE WHEN $8 THEN $9 ELSE warranty_expiry_date END, \
                vendor_id = CASE WHEN $10 THEN $11 ELSE vendor_id END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let after = sqlx::query_as::<_, AssetRow>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.category.map(|c| c.id()))
            .bind(input.asset_type.map(|t| t.id()))
            .bind(input.cost)
            .bind(input.useful_life_years)
            .bind(input.purchase_date)
            .bind(input.warranty_expiry_date.is_some())
            .bind(input.warranty_expiry_date.flatten())
            .bind(input.vendor_id.is_some())
            .bind(input.vendor_id.flatten())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((before, after)))
    }

    /// Unconditionally set an asset's status. Returns `None` if not found.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status_id: StatusId,
    ) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(id)
            .bind(status_id)
            .fetch_optional(pool)
            .await
    }

    /// Set an asset's status only if it still equals `expected_id`.
    ///
    /// Returns `None` when the asset is missing or its status moved on.
    pub async fn transition_status(
        pool: &PgPool,
        id: DbId,
        expected_id: StatusId,
        next_id: StatusId,
    ) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET status_id = $3 \
             WHERE id = $1 AND status_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(id)
            .bind(expected_id)
            .bind(next_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an asset that is neither allocated nor referenced by any
    /// allocation or warranty history row. The checks and the delete share one
    /// transaction with the asset row locked.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<AssetDeletion, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let status: Option<(StatusId,)> =
            sqlx::query_as("SELECT status_id FROM assets WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((status_id,)) = status else {
            return Ok(AssetDeletion::NotFound);
        };
        if status_id == AssetStatus::Allocated.id() {
            return Ok(AssetDeletion::Allocated);
        }

        let (has_history,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM asset_allocations WHERE asset_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if has_history {
            return Ok(AssetDeletion::HasAllocationHistory);
        }

        let (has_warranty,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM warranty_history WHERE asset_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if has_warranty {
            return Ok(AssetDeletion::HasWarrantyHistory);
        }

        sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(AssetDeletion::Deleted)
    }

    /// List assets matching every set predicate of `filter`, lowest id first.
    pub async fn search(pool: &PgPool, filter: &AssetFilter) -> Result<Vec<AssetRow>, sqlx::Error> {
        // Build dynamic WHERE clauses.
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if filter.category.is_some() {
            conditions.push(format!("category_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.asset_type.is_some() {
            conditions.push(format!("asset_type_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.status.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.vendor_id.is_some() {
            conditions.push(format!("vendor_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.name_contains.is_some() {
            conditions.push(format!("name ILIKE ${bind_idx} ESCAPE '\\'"));
            bind_idx += 1;
        }
        if filter.name_equals.is_some() {
            conditions.push(format!("LOWER(name) = LOWER(${bind_idx})"));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let query = format!("SELECT {COLUMNS} FROM assets {where_clause} ORDER BY id");

        let mut q = sqlx::query_as::<_, AssetRow>(&query);

        // Bind dynamic parameters in order.
        if let Some(category) = filter.category {
            q = q.bind(category.id());
        }
        if let Some(asset_type) = filter.asset_type {
            q = q.bind(asset_type.id());
        }
        if let Some(status) = filter.status {
            q = q.bind(status.id());
        }
        if let Some(vendor_id) = filter.vendor_id {
            q = q.bind(vendor_id);
        }
        if let Some(ref fragment) = filter.name_contains {
            q = q.bind(format!("%{}%", escape_like(fragment.trim())));
        }
        if let Some(ref name) = filter.name_equals {
            q = q.bind(name.trim().to_string());
        }

        q.fetch_all(pool).await
    }
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
