//! In-process side-effect bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` between the request path,
//! which publishes, and the [`SideEffectWriter`](crate::SideEffectWriter),
//! which subscribes.

use assetrack_core::notification::{NotificationRequest, ServiceLogEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// SideEffect
// ---------------------------------------------------------------------------

/// A write the ledger owes after a transition has committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SideEffect {
    ServiceLog(ServiceLogEntry),
    Notification(NotificationRequest),
}

impl SideEffect {
    /// Short label used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            SideEffect::ServiceLog(_) => "service_log",
            SideEffect::Notification(_) => "notification",
        }
    }
}

/// A [`SideEffect`] stamped with the time it was queued.
#[derive(Debug, Clone, Serialize)]
pub struct SideEffectEvent {
    pub effect: SideEffect,
    pub queued_at: DateTime<Utc>,
}

impl SideEffectEvent {
    pub fn new(effect: SideEffect) -> Self {
        Self {
            effect,
            queued_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`SideEffectEvent`].
///
/// # Usage
///
/// ```rust
/// use assetrack_core::notification::ServiceLogEntry;
/// use assetrack_events::bus::{EventBus, SideEffect, SideEffectEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(SideEffectEvent::new(SideEffect::ServiceLog(ServiceLogEntry {
///     asset_id: 1,
///     date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     description: "Asset A001 allocated to user 7".into(),
/// })));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<SideEffectEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that will see it; zero means the
    /// event was dropped.
    pub fn publish(&self, event: SideEffectEvent) -> usize {
        // A SendError only means there are zero receivers.
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<SideEffectEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assetrack_core::notification::NotificationType;
    use chrono::NaiveDate;

    fn log_entry() -> SideEffect {
        SideEffect::ServiceLog(ServiceLogEntry {
            asset_id: 42,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            description: "Asset A001 allocated to user 7".into(),
        })
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish(SideEffectEvent::new(log_entry())), 1);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.effect, log_entry());
        assert_eq!(received.effect.label(), "service_log");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let effect = SideEffect::Notification(NotificationRequest {
            user_id: 7,
            title: "Asset returned".into(),
            message: "Dell Latitude (A001) was returned.".into(),
            kind: NotificationType::AssetReturned,
            related_issue_id: None,
            related_asset_id: Some(42),
        });
        assert_eq!(bus.publish(SideEffectEvent::new(effect.clone())), 2);

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.effect, effect);
        assert_eq!(e2.effect, effect);
    }

    #[test]
    fn publish_with_no_subscribers_reports_zero() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(SideEffectEvent::new(log_entry())), 0);
    }
}
