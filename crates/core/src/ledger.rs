//! The allocation state machine.
//!
//! Per asset, the derived states are `Available`, `Allocated` and
//! `Unavailable` (MAINTENANCE/RETIRED/LOST). `allocate` and `return_asset`
//! couple the asset status write with the allocation row write through a
//! single atomic store call; the return handshake only touches the row.
//!
//! Service-log and notification writes happen after the atomic unit has
//! committed. Their failures are logged and dropped.

use std::sync::Arc;

use crate::allocation::{self, Allocation, NewAllocation};
use crate::asset::Asset;
use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::notification::{self, NotificationRequest, ServiceLogEntry};
use crate::ports::{AllocationStore, AssetStore, NotificationSink, ServiceLog, UserDirectory};
use crate::status::{AssetStatus, UserStatus};
use crate::types::{Date, DbId};

/// How many times a row-level compare-and-swap is re-evaluated after losing
/// to a concurrent writer before giving up.
const CAS_ATTEMPTS: usize = 3;

/// Collaborators wired into an [`AllocationLedger`].
#[derive(Clone)]
pub struct LedgerPorts {
    pub assets: Arc<dyn AssetStore>,
    pub allocations: Arc<dyn AllocationStore>,
    pub users: Arc<dyn UserDirectory>,
    pub service_log: Arc<dyn ServiceLog>,
    pub notifications: Arc<dyn NotificationSink>,
    pub clock: Arc<dyn Clock>,
}

/// Creates and closes allocations and drives the return-request handshake.
pub struct AllocationLedger {
    ports: LedgerPorts,
}

impl AllocationLedger {
    pub fn new(ports: LedgerPorts) -> Self {
        Self { ports }
    }

    /// Today's date according to the ledger clock.
    pub fn today(&self) -> Date {
        self.ports.clock.today()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Allocate an `AVAILABLE` asset to an `ACTIVE` user.
    ///
    /// The status flip and the row insert commit together; if another caller
    /// wins the race the store reports `AssetNotAvailable` and nothing is written.
    pub async fn allocate(
        &self,
        asset_id: DbId,
        user_id: DbId,
        date: Date,
        remarks: Option<String>,
    ) -> CoreResult<Allocation> {
        let asset = self.load_asset(asset_id).await?;
        if asset.status != AssetStatus::Available {
            return Err(CoreError::AssetNotAvailable {
                asset_id,
                status: asset.status,
            });
        }

        let user = self
            .ports
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| CoreError::user_not_found(user_id))?;
        if user.status != UserStatus::Active {
            return Err(CoreError::InvalidOperation(format!(
                "User {user_id} is not active"
            )));
        }

        let allocation = self
            .ports
            .allocations
            .open(&NewAllocation {
                asset_id,
                user_id,
                allocated_date: date,
                remarks,
            })
            .await?;

        tracing::info!(
            asset_id,
            user_id,
            allocation_id = allocation.id,
            "Asset allocated"
        );

        self.append_service_log(notification::allocation_log_entry(&asset, user_id, date))
            .await;
        self.send_notification(notification::allocated_notification(&asset, user_id))
            .await;

        Ok(allocation)
    }

    /// Close the active allocation of an asset and make the asset available again.
    ///
    /// Works from any active sub-state; the row always ends in `Returned`.
    pub async fn return_asset(
        &self,
        asset_id: DbId,
        date: Date,
        remarks: Option<String>,
    ) -> CoreResult<Allocation> {
        let asset = self.load_asset(asset_id).await?;

        for _ in 0..CAS_ATTEMPTS {
            let current = self.require_active(asset_id).await?;
            allocation::ensure_returnable(current.state)?;
            if date < current.allocated_date {
                return Err(CoreError::Validation(format!(
                    "Return date {date} is before allocation date {}",
                    current.allocated_date
                )));
            }

            let merged = allocation::merge_remarks(current.remarks.as_deref(), remarks.as_deref());
            let Some(closed) = self
                .ports
                .allocations
                .close(current.id, date, merged)
                .await?
            else {
                tracing::debug!(asset_id, allocation_id = current.id, "Return lost a race, re-reading");
                continue;
            };

            tracing::info!(
                asset_id,
                user_id = closed.user_id,
                allocation_id = closed.id,
                "Asset returned"
            );

            self.append_service_log(notification::return_log_entry(&asset, closed.user_id, date))
                .await;
            self.send_notification(notification::returned_notification(&asset, closed.user_id))
                .await;

            return Ok(closed);
        }

        Err(CoreError::no_active_allocation(asset_id))
    }

    /// Ask the current holder to give the asset back.
    ///
    /// Records the request date and remarks; neither the asset status nor the
    /// returned date changes.
    pub async fn request_return(
        &self,
        asset_id: DbId,
        remarks: Option<String>,
    ) -> CoreResult<Allocation> {
        let asset = self.load_asset(asset_id).await?;

        for _ in 0..CAS_ATTEMPTS {
            let current = self.require_active(asset_id).await?;
            let change = allocation::request_return(
                current.state,
                self.ports.clock.now(),
                remarks.clone(),
            )?;
            let Some(updated) = self
                .ports
                .allocations
                .apply_handshake(current.id, current.state, &change)
                .await?
            else {
                continue;
            };

            tracing::info!(
                asset_id,
                user_id = updated.user_id,
                allocation_id = updated.id,
                "Return requested"
            );

            self.send_notification(notification::return_requested_notification(
                &asset,
                updated.user_id,
                remarks.as_deref(),
            ))
            .await;

            return Ok(updated);
        }

        Err(CoreError::InvalidOperation(format!(
            "Allocation for asset {asset_id} kept changing; return request not recorded"
        )))
    }

    /// The holder confirms a pending return request.
    ///
    /// The asset stays allocated until [`return_asset`](Self::return_asset).
    pub async fn acknowledge_return(&self, asset_id: DbId, user_id: DbId) -> CoreResult<Allocation> {
        self.load_asset(asset_id).await?;

        for _ in 0..CAS_ATTEMPTS {
            let current = self.require_active(asset_id).await?;
            if current.user_id != user_id {
                return Err(CoreError::InvalidOperation(format!(
                    "User {user_id} does not hold asset {asset_id}"
                )));
            }
            let change = allocation::acknowledge_return(current.state)?;
            let Some(updated) = self
                .ports
                .allocations
                .apply_handshake(current.id, current.state, &change)
                .await?
            else {
                continue;
            };

            tracing::info!(
                asset_id,
                user_id,
                allocation_id = updated.id,
                "Return acknowledged"
            );
            return Ok(updated);
        }

        Err(CoreError::InvalidOperation(format!(
            "Allocation for asset {asset_id} kept changing; acknowledgement not recorded"
        )))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The single active allocation of an asset, if any.
    pub async fn current_allocation(&self, asset_id: DbId) -> CoreResult<Option<Allocation>> {
        self.load_asset(asset_id).await?;
        self.ports.allocations.find_active(asset_id).await
    }

    /// All allocations of an asset, most recent first.
    pub async fn allocation_history(&self, asset_id: DbId) -> CoreResult<Vec<Allocation>> {
        self.load_asset(asset_id).await?;
        self.ports.allocations.list_for_asset(asset_id).await
    }

    /// All allocations held by a user, most recent first.
    pub async fn user_allocations(
        &self,
        user_id: DbId,
        active_only: bool,
    ) -> CoreResult<Vec<Allocation>> {
        self.ports
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| CoreError::user_not_found(user_id))?;
        self.ports
            .allocations
            .list_for_user(user_id, active_only)
            .await
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn load_asset(&self, asset_id: DbId) -> CoreResult<Asset> {
        self.ports
            .assets
            .get(asset_id)
            .await?
            .ok_or_else(|| CoreError::asset_not_found(asset_id))
    }

    async fn require_active(&self, asset_id: DbId) -> CoreResult<Allocation> {
        self.ports
            .allocations
            .find_active(asset_id)
            .await?
            .ok_or_else(|| CoreError::no_active_allocation(asset_id))
    }

    async fn append_service_log(&self, entry: ServiceLogEntry) {
        if let Err(e) = self.ports.service_log.append(&entry).await {
            tracing::warn!(
                error = %e,
                asset_id = entry.asset_id,
                "Failed to append service log entry"
            );
        }
    }

    async fn send_notification(&self, notification: NotificationRequest) {
        if let Err(e) = self.ports.notifications.notify(&notification).await {
            tracing::warn!(
                error = %e,
                user_id = notification.user_id,
                kind = notification.kind.as_str(),
                "Failed to send notification"
            );
        }
    }
}
