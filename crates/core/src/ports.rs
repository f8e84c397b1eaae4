//! Collaborator interfaces consumed by the ledger, group allocator and registry.
//!
//! `assetrack-db` implements every port on PostgreSQL; [`crate::memory`]
//! implements them in-process. Side-effect ports ([`ServiceLog`],
//! [`NotificationSink`]) are called best-effort: their errors are logged by
//! the caller and never abort a state transition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::allocation::{Allocation, HandshakeChange, NewAllocation};
use crate::asset::{Asset, AssetUpdate, NewAsset};
use crate::error::CoreResult;
use crate::filter::AssetFilter;
use crate::notification::{NotificationRequest, ServiceLogEntry};
use crate::status::{AllocationState, AssetStatus, UserStatus};
use crate::types::{Date, DbId};
use crate::warranty::{WarrantyChange, WarrantyHistoryEntry};

/// Identity and activity status of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: DbId,
    pub name: String,
    pub status: UserStatus,
}

/// A vendor as seen by the asset registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRecord {
    pub id: DbId,
    pub name: String,
}

/// An asset row before and after an update, read and written in one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRevision {
    pub before: Asset,
    pub after: Asset,
}

/// Durable record of each asset.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn get(&self, id: DbId) -> CoreResult<Option<Asset>>;

    async fn get_by_tag(&self, tag: &str) -> CoreResult<Option<Asset>>;

    /// Insert a new `AVAILABLE` asset. Fails with `Duplicate` on a tag collision.
    async fn create(&self, input: &NewAsset) -> CoreResult<Asset>;

    /// Apply a descriptive patch. Returns `None` if the asset does not exist.
    ///
    /// The patched row is checked against the row it replaces, so a type that
    /// does not belong to the stored category fails with `Validation`.
    async fn update(&self, id: DbId, patch: &AssetUpdate) -> CoreResult<Option<AssetRevision>>;

    /// Unconditional status write. No business validation.
    async fn update_status(&self, id: DbId, status: AssetStatus) -> CoreResult<Option<Asset>>;

    /// Compare-and-swap on status. Returns `None` when the asset is missing or
    /// its status no longer equals `expected`.
    async fn transition_status(
        &self,
        id: DbId,
        expected: AssetStatus,
        next: AssetStatus,
    ) -> CoreResult<Option<Asset>>;

    /// Delete an asset. Fails with `InvalidOperation` while it is allocated or
    /// has allocation or warranty history, `NotFound` if it does not exist.
    async fn delete(&self, id: DbId) -> CoreResult<()>;

    /// All assets matching `filter`, lowest id first.
    async fn search(&self, filter: &AssetFilter) -> CoreResult<Vec<Asset>>;
}

/// Allocation rows plus the atomic status-coupled transitions.
#[async_trait]
pub trait AllocationStore: Send + Sync {
    /// Atomically move the asset `AVAILABLE -> ALLOCATED` and insert an active
    /// row. Fails with `AssetNotAvailable` if the status check loses, `NotFound`
    /// if the asset is missing.
    async fn open(&self, input: &NewAllocation) -> CoreResult<Allocation>;

    /// Atomically close an active row (state `Returned`, `returned_date`,
    /// `remarks`) and move its asset `ALLOCATED -> AVAILABLE`. Returns `None`
    /// when the row is no longer active.
    async fn close(
        &self,
        allocation_id: DbId,
        returned_date: Date,
        remarks: Option<String>,
    ) -> CoreResult<Option<Allocation>>;

    /// Apply a handshake change if the row is still active and in `expected`.
    async fn apply_handshake(
        &self,
        allocation_id: DbId,
        expected: AllocationState,
        change: &HandshakeChange,
    ) -> CoreResult<Option<Allocation>>;

    async fn find_active(&self, asset_id: DbId) -> CoreResult<Option<Allocation>>;

    /// Every row for an asset, most recent allocation first.
    async fn list_for_asset(&self, asset_id: DbId) -> CoreResult<Vec<Allocation>>;

    /// Every row for a user, most recent allocation first.
    async fn list_for_user(&self, user_id: DbId, active_only: bool)
        -> CoreResult<Vec<Allocation>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get(&self, user_id: DbId) -> CoreResult<Option<UserRecord>>;
}

#[async_trait]
pub trait VendorDirectory: Send + Sync {
    async fn get(&self, vendor_id: DbId) -> CoreResult<Option<VendorRecord>>;
}

/// Append-only warranty-expiry ledger.
#[async_trait]
pub trait WarrantyAuditLog: Send + Sync {
    /// Append one entry. Fails with `NotFound` if the asset does not exist.
    async fn record(&self, change: &WarrantyChange) -> CoreResult<WarrantyHistoryEntry>;

    /// Entries for an asset, newest first.
    async fn history(&self, asset_id: DbId) -> CoreResult<Vec<WarrantyHistoryEntry>>;
}

#[async_trait]
pub trait ServiceLog: Send + Sync {
    async fn append(&self, entry: &ServiceLogEntry) -> CoreResult<()>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &NotificationRequest) -> CoreResult<()>;
}
