//! Durable side-effect writer.
//!
//! [`SideEffectWriter`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every [`SideEffect`] to its table. It runs as a long-lived
//! background task and shuts down when the bus sender is dropped. Write
//! failures are logged and the event is dropped.

use assetrack_db::repositories::{NotificationRepo, ServiceLogRepo};
use assetrack_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::{SideEffect, SideEffectEvent};

/// Background service that persists queued side effects.
pub struct SideEffectWriter;

impl SideEffectWriter {
    /// Run the persistence loop until the channel is closed.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<SideEffectEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event.effect).await {
                        tracing::warn!(
                            error = %e,
                            effect = event.effect.label(),
                            queued_at = %event.queued_at,
                            "Failed to persist side effect"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Side-effect writer lagged, some writes were dropped"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, side-effect writer shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single side effect.
    pub async fn persist(pool: &DbPool, effect: &SideEffect) -> Result<(), sqlx::Error> {
        match effect {
            SideEffect::ServiceLog(entry) => {
                let row = ServiceLogRepo::create(pool, entry).await?;
                tracing::debug!(
                    asset_id = entry.asset_id,
                    service_log_id = row.id,
                    "Service log written"
                );
            }
            SideEffect::Notification(request) => {
                let row = NotificationRepo::create(pool, request).await?;
                tracing::debug!(
                    user_id = request.user_id,
                    notification_id = row.id,
                    kind = request.kind.as_str(),
                    "Notification written"
                );
            }
        }
        Ok(())
    }
}
