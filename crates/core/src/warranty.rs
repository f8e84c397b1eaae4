//! Warranty audit log entries and change detection.

use serde::{Deserialize, Serialize};

use crate::types::{Date, DbId, Timestamp};

/// Reason recorded when an asset is registered with a warranty date.
pub const REASON_INITIAL: &str = "Initial warranty registration";

/// Reason recorded when an update changes the warranty date.
pub const REASON_UPDATED: &str = "Warranty expiry date updated";

/// Reason recorded when an update clears the warranty date.
pub const REASON_CLEARED: &str = "Warranty expiry date removed";

/// One append-only row of the warranty audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarrantyHistoryEntry {
    pub id: DbId,
    pub asset_id: DbId,
    pub old_expiry_date: Option<Date>,
    pub new_expiry_date: Option<Date>,
    pub reason: String,
    pub changed_at: Timestamp,
}

/// A warranty change about to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct WarrantyChange {
    pub asset_id: DbId,
    pub old_expiry_date: Option<Date>,
    pub new_expiry_date: Option<Date>,
    pub reason: String,
}

/// The audit row owed by a newly registered asset, if any.
pub fn change_on_create(asset_id: DbId, expiry: Option<Date>) -> Option<WarrantyChange> {
    expiry.map(|date| WarrantyChange {
        asset_id,
        old_expiry_date: None,
        new_expiry_date: Some(date),
        reason: REASON_INITIAL.to_string(),
    })
}

/// The audit row owed by an update, if the expiry date actually changed.
///
/// Clearing a date counts as a change; writing the same date does not.
pub fn change_on_update(
    asset_id: DbId,
    old: Option<Date>,
    new: Option<Date>,
    reason: Option<&str>,
) -> Option<WarrantyChange> {
    if old == new {
        return None;
    }
    let default_reason = if new.is_none() {
        REASON_CLEARED
    } else {
        REASON_UPDATED
    };
    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(default_reason);
    Some(WarrantyChange {
        asset_id,
        old_expiry_date: old,
        new_expiry_date: new,
        reason: reason.to_string(),
    })
}
