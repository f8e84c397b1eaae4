//! Allocation records and the per-row return state machine.
//!
//! A row's lifecycle is a single [`AllocationState`]:
//!
//! ```text
//! Active ──request──▶ ReturnRequested ──acknowledge──▶ ReturnAcknowledged
//!   │                      │   ▲ (re-request)                 │
//!   └──────────────────────┴───┴─────────return───────────────┴──▶ Returned
//! ```
//!
//! `returned_date` is set exactly when the state is `Returned`. The legacy
//! four-value [`ReturnStatus`] is derived from the state, never stored.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::AllocationState;
use crate::types::{Date, DbId, Timestamp};

/// Separator inserted between the original remarks and the return remarks.
pub const RETURN_REMARKS_SEPARATOR: &str = " | Return: ";

/// A time-bounded assignment of one asset to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: DbId,
    pub asset_id: DbId,
    pub user_id: DbId,
    pub allocated_date: Date,
    pub returned_date: Option<Date>,
    pub remarks: Option<String>,
    pub return_request_date: Option<Timestamp>,
    pub return_request_remarks: Option<String>,
    pub state: AllocationState,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Allocation {
    /// An allocation is active until it has been returned.
    pub fn is_active(&self) -> bool {
        self.returned_date.is_none()
    }

    /// The legacy four-value view of the return handshake.
    pub fn return_status(&self) -> ReturnStatus {
        ReturnStatus::from(self.state)
    }
}

/// Legacy return-handshake status exposed alongside the unified state.
///
/// `Completed` is derived from `Returned`, so it always agrees with a
/// non-null `returned_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    None,
    Requested,
    Acknowledged,
    Completed,
}

impl From<AllocationState> for ReturnStatus {
    fn from(state: AllocationState) -> Self {
        match state {
            AllocationState::Active => ReturnStatus::None,
            AllocationState::ReturnRequested => ReturnStatus::Requested,
            AllocationState::ReturnAcknowledged => ReturnStatus::Acknowledged,
            AllocationState::Returned => ReturnStatus::Completed,
        }
    }
}

/// Input for opening a new allocation.
#[derive(Debug, Clone)]
pub struct NewAllocation {
    pub asset_id: DbId,
    pub user_id: DbId,
    pub allocated_date: Date,
    pub remarks: Option<String>,
}

/// Fields written by a return-handshake transition.
#[derive(Debug, Clone, PartialEq)]
pub struct HandshakeChange {
    pub state: AllocationState,
    /// `Some` only for a return request; leaves the request fields untouched otherwise.
    pub request: Option<ReturnRequest>,
}

/// Payload recorded by a return request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnRequest {
    pub requested_at: Timestamp,
    pub remarks: Option<String>,
}

/// Validate a request-return transition.
///
/// Any active sub-state may be (re-)requested; a second request refreshes
/// the request date and remarks and resets the handshake to `ReturnRequested`.
pub fn request_return(
    current: AllocationState,
    requested_at: Timestamp,
    remarks: Option<String>,
) -> Result<HandshakeChange, CoreError> {
    match current {
        AllocationState::Active
        | AllocationState::ReturnRequested
        | AllocationState::ReturnAcknowledged => Ok(HandshakeChange {
            state: AllocationState::ReturnRequested,
            request: Some(ReturnRequest {
                requested_at,
                remarks,
            }),
        }),
        AllocationState::Returned => Err(CoreError::InvalidOperation(
            "Cannot request return of an allocation that is already returned".into(),
        )),
    }
}

/// Validate an acknowledge-return transition. Only a pending request can be acknowledged.
pub fn acknowledge_return(current: AllocationState) -> Result<HandshakeChange, CoreError> {
    match current {
        AllocationState::ReturnRequested => Ok(HandshakeChange {
            state: AllocationState::ReturnAcknowledged,
            request: None,
        }),
        other => Err(CoreError::InvalidOperation(format!(
            "Return can only be acknowledged after it was requested (current state: {other})"
        ))),
    }
}

/// Validate that an allocation in `current` may be closed by a return.
pub fn ensure_returnable(current: AllocationState) -> Result<(), CoreError> {
    if current == AllocationState::Returned {
        return Err(CoreError::InvalidOperation(
            "Allocation is already returned".into(),
        ));
    }
    Ok(())
}

/// Append return remarks to the allocation remarks, preserving prior text.
///
/// Blank inputs are ignored on either side.
pub fn merge_remarks(existing: Option<&str>, returned: Option<&str>) -> Option<String> {
    let existing = existing.map(str::trim).filter(|s| !s.is_empty());
    let returned = returned.map(str::trim).filter(|s| !s.is_empty());
    match (existing, returned) {
        (Some(e), Some(r)) => Some(format!("{e}{RETURN_REMARKS_SEPARATOR}{r}")),
        (Some(e), None) => Some(e.to_string()),
        (None, Some(r)) => Some(format!("Return: {r}")),
        (None, None) => None,
    }
}

/// Order allocations most-recent first: by allocation date, then by id.
pub fn sort_most_recent_first(allocations: &mut [Allocation]) {
    allocations.sort_by(|a, b| {
        b.allocated_date
            .cmp(&a.allocated_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}
