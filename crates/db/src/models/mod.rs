//! Row models. Each maps one table and converts into its domain type.

pub mod allocation;
pub mod asset;
pub mod notification;
pub mod service_log;
pub mod user;
pub mod vendor;
pub mod warranty;

use assetrack_core::error::CoreError;
use assetrack_core::status::StatusId;

/// Resolve a lookup-table id into its enum, rejecting ids the code does not know.
pub(crate) fn lookup<T>(
    table: &'static str,
    id: StatusId,
    from_id: fn(StatusId) -> Option<T>,
) -> Result<T, CoreError> {
    from_id(id).ok_or_else(|| CoreError::Internal(format!("Unknown {table} id {id}")))
}
