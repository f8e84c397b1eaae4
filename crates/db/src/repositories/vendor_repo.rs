use assetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::vendor::{CreateVendor, VendorRow};

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct VendorRepo;

impl VendorRepo {
    pub async fn create(pool: &PgPool, input: &CreateVendor) -> Result<VendorRow, sqlx::Error> {
        let query = format!("INSERT INTO vendors (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, VendorRow>(&query)
            .bind(input.name.trim())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VendorRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vendors WHERE id = $1");
        sqlx::query_as::<_, VendorRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<VendorRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vendors ORDER BY name");
        sqlx::query_as::<_, VendorRow>(&query).fetch_all(pool).await
    }
}
