//! Queued side effects for the allocation ledger.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, carrying [`SideEffect`]s.
//! - [`QueuedSideEffects`]: implements the ledger's `ServiceLog` and
//!   `NotificationSink` ports by publishing to the bus, so a transition
//!   never waits on those writes.
//! - [`SideEffectWriter`]: background task draining the bus into the
//!   `service_logs` and `notifications` tables.

pub mod bus;
pub mod persistence;
pub mod queue;

pub use bus::{EventBus, SideEffect, SideEffectEvent};
pub use persistence::SideEffectWriter;
pub use queue::QueuedSideEffects;
