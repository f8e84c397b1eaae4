//! In-process implementation of every port.
//!
//! All state sits behind one mutex, so each trait call is a serializable
//! unit: the status compare-and-swap and the allocation row write in
//! [`AllocationStore::open`] / [`AllocationStore::close`] can never
//! interleave with another caller. Used by tests and local development.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::allocation::{self, Allocation, HandshakeChange, NewAllocation};
use crate::asset::{self, Asset, AssetUpdate, NewAsset};
use crate::error::{CoreError, CoreResult};
use crate::filter::AssetFilter;
use crate::notification::{NotificationRequest, ServiceLogEntry};
use crate::ports::{
    AllocationStore, AssetRevision, AssetStore, NotificationSink, ServiceLog, UserDirectory,
    UserRecord, VendorDirectory, VendorRecord, WarrantyAuditLog,
};
use crate::status::{AllocationState, AssetStatus, UserStatus};
use crate::types::{Date, DbId};
use crate::warranty::{WarrantyChange, WarrantyHistoryEntry};

#[derive(Default)]
struct State {
    next_id: DbId,
    assets: BTreeMap<DbId, Asset>,
    allocations: BTreeMap<DbId, Allocation>,
    warranty: Vec<WarrantyHistoryEntry>,
    users: HashMap<DbId, UserRecord>,
    vendors: HashMap<DbId, VendorRecord>,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn active_for(&self, asset_id: DbId) -> Option<&Allocation> {
        self.allocations
            .values()
            .find(|a| a.asset_id == asset_id && a.is_active())
    }
}

/// Mutex-guarded store implementing the asset, allocation, directory and
/// warranty ports.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a user in the directory and return its id.
    pub fn add_user(&self, name: &str, status: UserStatus) -> DbId {
        let mut state = self.state();
        let id = state.next_id();
        state.users.insert(
            id,
            UserRecord {
                id,
                name: name.to_string(),
                status,
            },
        );
        id
    }

    /// Register a vendor and return its id.
    pub fn add_vendor(&self, name: &str) -> DbId {
        let mut state = self.state();
        let id = state.next_id();
        state.vendors.insert(
            id,
            VendorRecord {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    /// Number of active allocation rows for an asset.
    pub fn active_count(&self, asset_id: DbId) -> usize {
        self.state()
            .allocations
            .values()
            .filter(|a| a.asset_id == asset_id && a.is_active())
            .count()
    }

    /// Total allocation rows for an asset.
    pub fn allocation_count(&self, asset_id: DbId) -> usize {
        self.state()
            .allocations
            .values()
            .filter(|a| a.asset_id == asset_id)
            .count()
    }
}

#[async_trait]
impl AssetStore for InMemoryStore {
    async fn get(&self, id: DbId) -> CoreResult<Option<Asset>> {
        Ok(self.state().assets.get(&id).cloned())
    }

    async fn get_by_tag(&self, tag: &str) -> CoreResult<Option<Asset>> {
        Ok(self
            .state()
            .assets
            .values()
            .find(|a| a.tag == tag)
            .cloned())
    }

    async fn create(&self, input: &NewAsset) -> CoreResult<Asset> {
        let mut state = self.state();
        if state.assets.values().any(|a| a.tag == input.tag) {
            return Err(CoreError::Duplicate(format!(
                "Asset tag '{}' already exists",
                input.tag
            )));
        }
        let id = state.next_id();
        let now = Utc::now();
        let asset = Asset {
            id,
            tag: input.tag.clone(),
            name: input.name.clone(),
            category: input.category,
            asset_type: input.asset_type,
            status: AssetStatus::Available,
            cost: input.cost,
            useful_life_years: input.useful_life_years,
            purchase_date: input.purchase_date,
            warranty_expiry_date: input.warranty_expiry_date,
            vendor_id: input.vendor_id,
            created_at: now,
            updated_at: now,
        };
        state.assets.insert(id, asset.clone());
        Ok(asset)
    }

    async fn update(&self, id: DbId, patch: &AssetUpdate) -> CoreResult<Option<AssetRevision>> {
        let mut state = self.state();
        let Some(existing) = state.assets.get_mut(&id) else {
            return Ok(None);
        };
        let before = existing.clone();
        let mut after = patch.apply_to(&before);
        asset::validate_updated_asset(&after)?;
        after.updated_at = Utc::now();
        *existing = after.clone();
        Ok(Some(AssetRevision { before, after }))
    }

    async fn update_status(&self, id: DbId, status: AssetStatus) -> CoreResult<Option<Asset>> {
        let mut state = self.state();
        Ok(state.assets.get_mut(&id).map(|asset| {
            asset.status = status;
            asset.updated_at = Utc::now();
            asset.clone()
        }))
    }

    async fn transition_status(
        &self,
        id: DbId,
        expected: AssetStatus,
        next: AssetStatus,
    ) -> CoreResult<Option<Asset>> {
        let mut state = self.state();
        match state.assets.get_mut(&id) {
            Some(asset) if asset.status == expected => {
                asset.status = next;
                asset.updated_at = Utc::now();
                Ok(Some(asset.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: DbId) -> CoreResult<()> {
        let mut state = self.state();
        let Some(asset) = state.assets.get(&id) else {
            return Err(CoreError::asset_not_found(id));
        };
        if asset.status == AssetStatus::Allocated {
            return Err(CoreError::InvalidOperation(format!(
                "Asset {id} is allocated and cannot be deleted"
            )));
        }
        if state.allocations.values().any(|a| a.asset_id == id) {
            return Err(CoreError::InvalidOperation(format!(
                "Asset {id} has allocation history and cannot be deleted"
            )));
        }
        if state.warranty.iter().any(|w| w.asset_id == id) {
            return Err(CoreError::InvalidOperation(format!(
                "Asset {id} has warranty history and cannot be deleted"
            )));
        }
        state.assets.remove(&id);
        Ok(())
    }

    async fn search(&self, filter: &AssetFilter) -> CoreResult<Vec<Asset>> {
        // BTreeMap iteration is already id-ascending.
        Ok(self
            .state()
            .assets
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AllocationStore for InMemoryStore {
    async fn open(&self, input: &NewAllocation) -> CoreResult<Allocation> {
        let mut state = self.state();
        let status = state
            .assets
            .get(&input.asset_id)
            .map(|a| a.status)
            .ok_or_else(|| CoreError::asset_not_found(input.asset_id))?;
        if status != AssetStatus::Available || state.active_for(input.asset_id).is_some() {
            return Err(CoreError::AssetNotAvailable {
                asset_id: input.asset_id,
                status,
            });
        }

        let id = state.next_id();
        let now = Utc::now();
        let allocation = Allocation {
            id,
            asset_id: input.asset_id,
            user_id: input.user_id,
            allocated_date: input.allocated_date,
            returned_date: None,
            remarks: input.remarks.clone(),
            return_request_date: None,
            return_request_remarks: None,
            state: AllocationState::Active,
            created_at: now,
            updated_at: now,
        };
        if let Some(asset) = state.assets.get_mut(&input.asset_id) {
            asset.status = AssetStatus::Allocated;
            asset.updated_at = now;
        }
        state.allocations.insert(id, allocation.clone());
        Ok(allocation)
    }

    async fn close(
        &self,
        allocation_id: DbId,
        returned_date: Date,
        remarks: Option<String>,
    ) -> CoreResult<Option<Allocation>> {
        let mut state = self.state();
        let now = Utc::now();
        let closed = match state.allocations.get_mut(&allocation_id) {
            Some(row) if row.is_active() => {
                row.returned_date = Some(returned_date);
                row.remarks = remarks;
                row.state = AllocationState::Returned;
                row.updated_at = now;
                row.clone()
            }
            _ => return Ok(None),
        };
        if let Some(asset) = state.assets.get_mut(&closed.asset_id) {
            if asset.status == AssetStatus::Allocated {
                asset.status = AssetStatus::Available;
                asset.updated_at = now;
            }
        }
        Ok(Some(closed))
    }

    async fn apply_handshake(
        &self,
        allocation_id: DbId,
        expected: AllocationState,
        change: &HandshakeChange,
    ) -> CoreResult<Option<Allocation>> {
        let mut state = self.state();
        match state.allocations.get_mut(&allocation_id) {
            Some(row) if row.is_active() && row.state == expected => {
                row.state = change.state;
                if let Some(request) = &change.request {
                    row.return_request_date = Some(request.requested_at);
                    row.return_request_remarks = request.remarks.clone();
                }
                row.updated_at = Utc::now();
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_active(&self, asset_id: DbId) -> CoreResult<Option<Allocation>> {
        Ok(self.state().active_for(asset_id).cloned())
    }

    async fn list_for_asset(&self, asset_id: DbId) -> CoreResult<Vec<Allocation>> {
        let mut rows: Vec<_> = self
            .state()
            .allocations
            .values()
            .filter(|a| a.asset_id == asset_id)
            .cloned()
            .collect();
        allocation::sort_most_recent_first(&mut rows);
        Ok(rows)
    }

    async fn list_for_user(
        &self,
        user_id: DbId,
        active_only: bool,
    ) -> CoreResult<Vec<Allocation>> {
        let mut rows: Vec<_> = self
            .state()
            .allocations
            .values()
            .filter(|a| a.user_id == user_id && (!active_only || a.is_active()))
            .cloned()
            .collect();
        allocation::sort_most_recent_first(&mut rows);
        Ok(rows)
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn get(&self, user_id: DbId) -> CoreResult<Option<UserRecord>> {
        Ok(self.state().users.get(&user_id).cloned())
    }
}

#[async_trait]
impl VendorDirectory for InMemoryStore {
    async fn get(&self, vendor_id: DbId) -> CoreResult<Option<VendorRecord>> {
        Ok(self.state().vendors.get(&vendor_id).cloned())
    }
}

#[async_trait]
impl WarrantyAuditLog for InMemoryStore {
    async fn record(&self, change: &WarrantyChange) -> CoreResult<WarrantyHistoryEntry> {
        let mut state = self.state();
        if !state.assets.contains_key(&change.asset_id) {
            return Err(CoreError::asset_not_found(change.asset_id));
        }
        let entry = WarrantyHistoryEntry {
            id: state.next_id(),
            asset_id: change.asset_id,
            old_expiry_date: change.old_expiry_date,
            new_expiry_date: change.new_expiry_date,
            reason: change.reason.clone(),
            changed_at: Utc::now(),
        };
        state.warranty.push(entry.clone());
        Ok(entry)
    }

    async fn history(&self, asset_id: DbId) -> CoreResult<Vec<WarrantyHistoryEntry>> {
        Ok(self
            .state()
            .warranty
            .iter()
            .rev()
            .filter(|w| w.asset_id == asset_id)
            .cloned()
            .collect())
    }
}

/// Side-effect sink that keeps everything it receives. Can be switched to
/// fail every call.
#[derive(Default)]
pub struct RecordingSideEffects {
    failing: AtomicBool,
    service_log: Mutex<Vec<ServiceLogEntry>>,
    notifications: Mutex<Vec<NotificationRequest>>,
}

impl RecordingSideEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn service_log(&self) -> Vec<ServiceLogEntry> {
        self.service_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn notifications(&self) -> Vec<NotificationRequest> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check(&self) -> CoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CoreError::Internal("side-effect sink unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceLog for RecordingSideEffects {
    async fn append(&self, entry: &ServiceLogEntry) -> CoreResult<()> {
        self.check()?;
        self.service_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for RecordingSideEffects {
    async fn notify(&self, notification: &NotificationRequest) -> CoreResult<()> {
        self.check()?;
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
        Ok(())
    }
}
