use std::sync::Arc;

use assetrack_core::clock::{Clock, SystemClock};
use assetrack_core::group::GroupAllocator;
use assetrack_core::ledger::{AllocationLedger, LedgerPorts};
use assetrack_core::registry::{AssetRegistry, RegistryPorts};
use assetrack_db::store::PgStore;
use assetrack_events::{EventBus, QueuedSideEffects};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: assetrack_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Bus carrying queued service-log and notification writes.
    pub event_bus: Arc<EventBus>,
    pub ledger: Arc<AllocationLedger>,
    pub groups: Arc<GroupAllocator>,
    pub registry: Arc<AssetRegistry>,
}

impl AppState {
    /// Wire the domain services onto PostgreSQL, routing side effects
    /// through `event_bus`.
    pub fn new(pool: assetrack_db::DbPool, config: ServerConfig, event_bus: Arc<EventBus>) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        let side_effects = Arc::new(QueuedSideEffects::new(Arc::clone(&event_bus)));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let ledger = Arc::new(AllocationLedger::new(LedgerPorts {
            assets: store.clone(),
            allocations: store.clone(),
            users: store.clone(),
            service_log: side_effects.clone(),
            notifications: side_effects,
            clock: Arc::clone(&clock),
        }));
        let groups = Arc::new(
            GroupAllocator::new(store.clone(), Arc::clone(&ledger))
                .with_max_attempts(config.group_allocation_attempts),
        );
        let registry = Arc::new(AssetRegistry::new(RegistryPorts {
            assets: store.clone(),
            warranty: store.clone(),
            vendors: store,
            clock,
        }));

        Self {
            pool,
            config: Arc::new(config),
            event_bus,
            ledger,
            groups,
            registry,
        }
    }
}
