//! Translation of `sqlx` failures into domain errors.

use assetrack_core::error::CoreError;

/// Unique constraint on `assets.tag`.
pub const ASSET_TAG_CONSTRAINT: &str = "uq_assets_tag";

/// Partial unique index allowing one active allocation per asset.
pub const ACTIVE_ALLOCATION_CONSTRAINT: &str = "uq_asset_allocations_active";

/// Composite foreign key pairing `assets.asset_type_id` with its category.
pub const TYPE_CATEGORY_CONSTRAINT: &str = "fk_assets_type_category";

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Whether `err` is a unique violation on `constraint`.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
            && db.constraint() == Some(constraint)
    )
}

/// Whether `err` is a foreign key violation.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
    )
}

/// Map a database error without call-site context.
///
/// - unique violation on the tag constraint: `Duplicate`
/// - other unique violations: `Duplicate` naming the constraint
/// - the type/category pairing: `Validation` naming the rule
/// - other foreign key and check violations: `Validation`
/// - everything else: `Internal`
pub fn map_db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db) = &err {
        let constraint = db.constraint().unwrap_or("unknown");
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) if constraint == ASSET_TAG_CONSTRAINT => {
                return CoreError::Duplicate("Asset tag already exists".into());
            }
            Some(UNIQUE_VIOLATION) => {
                return CoreError::Duplicate(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
            Some(FOREIGN_KEY_VIOLATION) if constraint == TYPE_CATEGORY_CONSTRAINT => {
                return CoreError::Validation(
                    "Asset type does not belong to the asset's category".into(),
                );
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return CoreError::Validation(format!(
                    "Referenced row does not exist ({constraint})"
                ));
            }
            Some(CHECK_VIOLATION) => {
                return CoreError::Validation(format!("Constraint {constraint} violated"));
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(err.to_string())
}
