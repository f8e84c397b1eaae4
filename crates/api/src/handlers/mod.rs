//! HTTP handlers, grouped by resource.

pub mod allocations;
pub mod assets;
pub mod users;
pub mod vendors;

use crate::error::{AppError, AppResult};

/// Parse an optional lookup label from a query string, rejecting unknown values.
pub(crate) fn parse_label<T>(
    field: &str,
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
) -> AppResult<Option<T>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(label) => parse(label)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown {field} '{label}'"))),
    }
}
