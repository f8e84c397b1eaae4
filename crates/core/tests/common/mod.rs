//! Shared fixtures: an in-memory store wired into ledger, group allocator
//! and registry with a pinned clock.

#![allow(dead_code)]

use std::sync::Arc;

use assetrack_core::asset::{Asset, NewAsset};
use assetrack_core::clock::FixedClock;
use assetrack_core::group::GroupAllocator;
use assetrack_core::ledger::{AllocationLedger, LedgerPorts};
use assetrack_core::memory::{InMemoryStore, RecordingSideEffects};
use assetrack_core::ports::AssetStore;
use assetrack_core::registry::{AssetRegistry, RegistryPorts};
use assetrack_core::status::{AssetCategory, AssetStatus, AssetType, UserStatus};
use assetrack_core::types::{Date, DbId};
use chrono::{NaiveDate, TimeZone, Utc};

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub effects: Arc<RecordingSideEffects>,
    pub ledger: Arc<AllocationLedger>,
    pub groups: GroupAllocator,
    pub registry: AssetRegistry,
}

pub fn date(y: i32, m: u32, d: u32) -> Date {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let effects = Arc::new(RecordingSideEffects::new());
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap(),
    ));

    let ledger = Arc::new(AllocationLedger::new(LedgerPorts {
        assets: store.clone(),
        allocations: store.clone(),
        users: store.clone(),
        service_log: effects.clone(),
        notifications: effects.clone(),
        clock: clock.clone(),
    }));
    let groups = GroupAllocator::new(store.clone(), Arc::clone(&ledger));
    let registry = AssetRegistry::new(RegistryPorts {
        assets: store.clone(),
        warranty: store.clone(),
        vendors: store.clone(),
        clock,
    });

    Harness {
        store,
        effects,
        ledger,
        groups,
        registry,
    }
}

pub fn new_laptop(tag: &str, name: &str) -> NewAsset {
    NewAsset {
        tag: tag.to_string(),
        name: name.to_string(),
        category: AssetCategory::Hardware,
        asset_type: AssetType::Laptop,
        cost: 1500.0,
        useful_life_years: 4,
        purchase_date: date(2023, 6, 1),
        warranty_expiry_date: None,
        vendor_id: None,
    }
}

impl Harness {
    pub async fn laptop(&self, tag: &str, name: &str) -> Asset {
        self.registry.create(&new_laptop(tag, name)).await.unwrap()
    }

    pub fn active_user(&self, name: &str) -> DbId {
        self.store.add_user(name, UserStatus::Active)
    }

    pub fn inactive_user(&self, name: &str) -> DbId {
        self.store.add_user(name, UserStatus::Inactive)
    }

    pub async fn status_of(&self, asset_id: DbId) -> AssetStatus {
        AssetStore::get(self.store.as_ref(), asset_id)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    /// The core invariant: ALLOCATED iff exactly one active row.
    pub async fn assert_invariant(&self, asset_id: DbId) {
        let active = self.store.active_count(asset_id);
        let status = self.status_of(asset_id).await;
        assert!(active <= 1, "asset {asset_id} has {active} active allocations");
        assert_eq!(
            active == 1,
            status == AssetStatus::Allocated,
            "asset {asset_id}: status {status} with {active} active rows"
        );
    }
}
