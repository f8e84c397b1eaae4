use crate::status::AssetStatus;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Entity not found: {entity} with key {key}")]
    NotFoundByKey { entity: &'static str, key: String },

    #[error("Asset {asset_id} is not available (status: {status})")]
    AssetNotAvailable { asset_id: DbId, status: AssetStatus },

    #[error("Duplicate resource: {0}")]
    Duplicate(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing asset.
    pub fn asset_not_found(id: DbId) -> Self {
        CoreError::NotFound {
            entity: "Asset",
            id,
        }
    }

    /// Shorthand for a missing user.
    pub fn user_not_found(id: DbId) -> Self {
        CoreError::NotFound { entity: "User", id }
    }

    /// Shorthand for an asset with no active allocation. The id is the asset id.
    pub fn no_active_allocation(asset_id: DbId) -> Self {
        CoreError::NotFound {
            entity: "Active allocation for asset",
            id: asset_id,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
