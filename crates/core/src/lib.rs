//! Asset allocation domain logic.
//!
//! Pure types and rules (assets, allocations, warranty audit, filters,
//! depreciation) plus the services that drive them through collaborator
//! ports: [`ledger::AllocationLedger`], [`group::GroupAllocator`] and
//! [`registry::AssetRegistry`]. No database dependencies; persistence lives
//! in `assetrack-db`.

pub mod allocation;
pub mod asset;
pub mod clock;
pub mod depreciation;
pub mod error;
pub mod filter;
pub mod group;
pub mod ledger;
pub mod memory;
pub mod notification;
pub mod ports;
pub mod registry;
pub mod status;
pub mod types;
pub mod warranty;
