use assetrack_core::status::{AllocationState, AssetCategory, AssetStatus, AssetType, UserStatus};
use sqlx::PgPool;

/// Connect, migrate, verify the pool answers.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_check(pool: PgPool) {
    assetrack_db::health_check(&pool).await.unwrap();
}

async fn seeded(pool: &PgPool, table: &str) -> Vec<(i16, String)> {
    sqlx::query_as(&format!("SELECT id, name FROM {table} ORDER BY id"))
        .fetch_all(pool)
        .await
        .unwrap_or_else(|e| panic!("{table} query failed: {e}"))
}

/// Lookup seed rows must line up with the enum discriminants and labels.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lookup_tables_match_enums(pool: PgPool) {
    let expected: [(&str, Vec<(i16, String)>); 5] = [
        (
            "asset_statuses",
            AssetStatus::ALL.iter().map(|s| (s.id(), s.as_str().to_string())).collect(),
        ),
        (
            "asset_categories",
            AssetCategory::ALL.iter().map(|s| (s.id(), s.as_str().to_string())).collect(),
        ),
        (
            "asset_types",
            AssetType::ALL.iter().map(|s| (s.id(), s.as_str().to_string())).collect(),
        ),
        (
            "allocation_states",
            AllocationState::ALL.iter().map(|s| (s.id(), s.as_str().to_string())).collect(),
        ),
        (
            "user_statuses",
            UserStatus::ALL.iter().map(|s| (s.id(), s.as_str().to_string())).collect(),
        ),
    ];

    for (table, rows) in expected {
        assert_eq!(seeded(&pool, table).await, rows, "{table} seed drifted");
    }
}

/// Each asset type's category in the database matches `AssetType::category`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_asset_type_categories_match(pool: PgPool) {
    let rows: Vec<(i16, i16)> = sqlx::query_as("SELECT id, category_id FROM asset_types ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();

    for (type_id, category_id) in rows {
        let asset_type = AssetType::from_id(type_id).unwrap();
        assert_eq!(asset_type.category().id(), category_id, "{asset_type}");
    }
}
