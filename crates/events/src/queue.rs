//! Ledger side-effect ports that enqueue onto the [`EventBus`].

use std::sync::Arc;

use assetrack_core::error::{CoreError, CoreResult};
use assetrack_core::notification::{NotificationRequest, ServiceLogEntry};
use assetrack_core::ports::{NotificationSink, ServiceLog};
use async_trait::async_trait;

use crate::bus::{EventBus, SideEffect, SideEffectEvent};

/// Publishes service-log and notification writes instead of performing them.
///
/// Enqueueing fails only when no writer is subscribed; the ledger logs that
/// and carries on.
#[derive(Clone)]
pub struct QueuedSideEffects {
    bus: Arc<EventBus>,
}

impl QueuedSideEffects {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    fn enqueue(&self, effect: SideEffect) -> CoreResult<()> {
        let label = effect.label();
        if self.bus.publish(SideEffectEvent::new(effect)) == 0 {
            return Err(CoreError::Internal(format!(
                "No side-effect writer subscribed; {label} dropped"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceLog for QueuedSideEffects {
    async fn append(&self, entry: &ServiceLogEntry) -> CoreResult<()> {
        self.enqueue(SideEffect::ServiceLog(entry.clone()))
    }
}

#[async_trait]
impl NotificationSink for QueuedSideEffects {
    async fn notify(&self, notification: &NotificationRequest) -> CoreResult<()> {
        self.enqueue(SideEffect::Notification(notification.clone()))
    }
}
