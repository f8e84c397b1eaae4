//! Allocation ledger behaviour against the in-memory store:
//! - allocate / return round trip and the ALLOCATED-iff-active invariant
//! - precondition failures leave no rows behind
//! - return-request handshake ordering
//! - side-effect failures never leak into results
//! - concurrent allocate race on a single asset

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use assetrack_core::allocation::ReturnStatus;
use assetrack_core::error::CoreError;
use assetrack_core::notification::NotificationType;
use assetrack_core::ports::{AllocationStore, AssetStore};
use assetrack_core::status::{AllocationState, AssetStatus};
use common::{date, harness};

// ---------------------------------------------------------------------------
// allocate / return
// ---------------------------------------------------------------------------

#[tokio::test]
async fn allocate_then_return_scenario() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let u1 = h.active_user("U1");

    let allocation = h
        .ledger
        .allocate(asset.id, u1, date(2024, 1, 1), Some("onboarding".into()))
        .await
        .unwrap();
    assert_eq!(allocation.allocated_date, date(2024, 1, 1));
    assert_eq!(allocation.returned_date, None);
    assert_eq!(allocation.state, AllocationState::Active);
    assert_eq!(allocation.return_status(), ReturnStatus::None);
    assert_eq!(h.status_of(asset.id).await, AssetStatus::Allocated);
    h.assert_invariant(asset.id).await;

    let returned = h
        .ledger
        .return_asset(asset.id, date(2024, 6, 1), Some("role change".into()))
        .await
        .unwrap();
    assert_eq!(returned.id, allocation.id);
    assert_eq!(returned.returned_date, Some(date(2024, 6, 1)));
    assert_eq!(returned.state, AllocationState::Returned);
    assert_eq!(returned.return_status(), ReturnStatus::Completed);
    let remarks = returned.remarks.unwrap();
    assert!(remarks.contains("onboarding"));
    assert!(remarks.contains("role change"));

    assert_eq!(h.status_of(asset.id).await, AssetStatus::Available);
    h.assert_invariant(asset.id).await;

    let history = h.ledger.allocation_history(asset.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].returned_date, Some(date(2024, 6, 1)));
}

#[tokio::test]
async fn allocate_unavailable_asset_fails_without_rows() {
    let h = harness();
    let user = h.active_user("U1");

    for status in [AssetStatus::Maintenance, AssetStatus::Retired, AssetStatus::Lost] {
        let asset = h
            .laptop(&format!("A-{}", status.as_str()), "Dell Latitude")
            .await;
        h.registry.set_status(asset.id, status).await.unwrap();

        let err = h
            .ledger
            .allocate(asset.id, user, date(2024, 1, 1), None)
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::AssetNotAvailable { status: s, .. } if s == status);
        assert_eq!(h.store.allocation_count(asset.id), 0);
        h.assert_invariant(asset.id).await;
    }
}

#[tokio::test]
async fn allocate_already_allocated_asset_fails() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let u1 = h.active_user("U1");
    let u2 = h.active_user("U2");

    h.ledger
        .allocate(asset.id, u1, date(2024, 1, 1), None)
        .await
        .unwrap();
    let err = h
        .ledger
        .allocate(asset.id, u2, date(2024, 1, 2), None)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        CoreError::AssetNotAvailable {
            status: AssetStatus::Allocated,
            ..
        }
    );
    assert_eq!(h.store.allocation_count(asset.id), 1);
}

#[tokio::test]
async fn allocate_to_inactive_user_is_invalid() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let user = h.inactive_user("Gone");

    let err = h
        .ledger
        .allocate(asset.id, user, date(2024, 1, 1), None)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::InvalidOperation(_));
    assert_eq!(h.status_of(asset.id).await, AssetStatus::Available);
    assert_eq!(h.store.allocation_count(asset.id), 0);
}

#[tokio::test]
async fn allocate_unknown_asset_or_user_is_not_found() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let user = h.active_user("U1");

    assert_matches!(
        h.ledger.allocate(9999, user, date(2024, 1, 1), None).await,
        Err(CoreError::NotFound { entity: "Asset", id: 9999 })
    );
    assert_matches!(
        h.ledger.allocate(asset.id, 8888, date(2024, 1, 1), None).await,
        Err(CoreError::NotFound { entity: "User", id: 8888 })
    );
    assert_eq!(h.store.allocation_count(asset.id), 0);
}

#[tokio::test]
async fn return_without_active_allocation_is_not_found() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;

    assert_matches!(
        h.ledger.return_asset(asset.id, date(2024, 1, 1), None).await,
        Err(CoreError::NotFound { .. })
    );
    assert_eq!(h.status_of(asset.id).await, AssetStatus::Available);
}

#[tokio::test]
async fn return_before_allocation_date_is_rejected() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let user = h.active_user("U1");
    h.ledger
        .allocate(asset.id, user, date(2024, 5, 1), None)
        .await
        .unwrap();

    assert_matches!(
        h.ledger.return_asset(asset.id, date(2024, 4, 30), None).await,
        Err(CoreError::Validation(_))
    );
    assert_eq!(h.status_of(asset.id).await, AssetStatus::Allocated);
    h.assert_invariant(asset.id).await;
}

#[tokio::test]
async fn reallocation_after_return_keeps_history_newest_first() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let u1 = h.active_user("U1");
    let u2 = h.active_user("U2");

    h.ledger
        .allocate(asset.id, u1, date(2024, 1, 1), None)
        .await
        .unwrap();
    h.ledger
        .return_asset(asset.id, date(2024, 2, 1), None)
        .await
        .unwrap();
    let second = h
        .ledger
        .allocate(asset.id, u2, date(2024, 3, 1), None)
        .await
        .unwrap();

    let history = h.ledger.allocation_history(asset.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
    assert_eq!(history[1].user_id, u1);

    let current = h.ledger.current_allocation(asset.id).await.unwrap().unwrap();
    assert_eq!(current.user_id, u2);
    h.assert_invariant(asset.id).await;
}

#[tokio::test]
async fn user_allocations_can_be_narrowed_to_active() {
    let h = harness();
    let a = h.laptop("A001", "Dell Latitude").await;
    let b = h.laptop("A002", "Dell Latitude").await;
    let user = h.active_user("U1");

    h.ledger.allocate(a.id, user, date(2024, 1, 1), None).await.unwrap();
    h.ledger.allocate(b.id, user, date(2024, 2, 1), None).await.unwrap();
    h.ledger.return_asset(a.id, date(2024, 3, 1), None).await.unwrap();

    let all = h.ledger.user_allocations(user, false).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].asset_id, b.id);

    let active = h.ledger.user_allocations(user, true).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].asset_id, b.id);
}

// ---------------------------------------------------------------------------
// Return-request handshake
// ---------------------------------------------------------------------------

#[tokio::test]
async fn acknowledge_requires_prior_request() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let user = h.active_user("U1");
    h.ledger
        .allocate(asset.id, user, date(2024, 1, 1), None)
        .await
        .unwrap();

    assert_matches!(
        h.ledger.acknowledge_return(asset.id, user).await,
        Err(CoreError::InvalidOperation(_))
    );
    let current = h.ledger.current_allocation(asset.id).await.unwrap().unwrap();
    assert_eq!(current.state, AllocationState::Active);
}

#[tokio::test]
async fn full_handshake_then_return() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let user = h.active_user("U1");
    h.ledger
        .allocate(asset.id, user, date(2024, 1, 1), None)
        .await
        .unwrap();

    let requested = h
        .ledger
        .request_return(asset.id, Some("hardware refresh".into()))
        .await
        .unwrap();
    assert_eq!(requested.return_status(), ReturnStatus::Requested);
    assert_eq!(
        requested.return_request_remarks.as_deref(),
        Some("hardware refresh")
    );
    assert_eq!(
        requested.return_request_date.map(|t| t.date_naive()),
        Some(date(2024, 3, 15))
    );
    assert_eq!(requested.returned_date, None);
    assert_eq!(h.status_of(asset.id).await, AssetStatus::Allocated);

    let acknowledged = h.ledger.acknowledge_return(asset.id, user).await.unwrap();
    assert_eq!(acknowledged.return_status(), ReturnStatus::Acknowledged);
    assert_eq!(h.status_of(asset.id).await, AssetStatus::Allocated);

    let returned = h
        .ledger
        .return_asset(asset.id, date(2024, 3, 20), None)
        .await
        .unwrap();
    assert_eq!(returned.return_status(), ReturnStatus::Completed);
    assert_eq!(h.status_of(asset.id).await, AssetStatus::Available);
    h.assert_invariant(asset.id).await;
}

#[tokio::test]
async fn only_the_holder_can_acknowledge() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let holder = h.active_user("U1");
    let other = h.active_user("U2");
    h.ledger
        .allocate(asset.id, holder, date(2024, 1, 1), None)
        .await
        .unwrap();
    h.ledger.request_return(asset.id, None).await.unwrap();

    assert_matches!(
        h.ledger.acknowledge_return(asset.id, other).await,
        Err(CoreError::InvalidOperation(_))
    );
}

#[tokio::test]
async fn request_return_without_allocation_is_not_found() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    assert_matches!(
        h.ledger.request_return(asset.id, None).await,
        Err(CoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn return_request_sends_warning_to_holder() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let user = h.active_user("U1");
    h.ledger
        .allocate(asset.id, user, date(2024, 1, 1), None)
        .await
        .unwrap();
    h.ledger
        .request_return(asset.id, Some("audit".into()))
        .await
        .unwrap();

    let notifications = h.effects.notifications();
    let kinds: Vec<_> = notifications.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![NotificationType::AssetAllocated, NotificationType::Warning]
    );
    assert!(notifications.iter().all(|n| n.user_id == user));
}

#[tokio::test]
async fn closing_keeps_a_status_overridden_at_the_store() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let user = h.active_user("U1");
    let allocation = h
        .ledger
        .allocate(asset.id, user, date(2024, 1, 1), None)
        .await
        .unwrap();

    AssetStore::update_status(h.store.as_ref(), asset.id, AssetStatus::Lost)
        .await
        .unwrap()
        .unwrap();
    let closed = AllocationStore::close(h.store.as_ref(), allocation.id, date(2024, 2, 1), None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(closed.state, AllocationState::Returned);
    assert_eq!(h.status_of(asset.id).await, AssetStatus::Lost);
}

// ---------------------------------------------------------------------------
// Side effects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn side_effects_are_written_for_allocate_and_return() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let user = h.active_user("U1");

    h.ledger
        .allocate(asset.id, user, date(2024, 1, 1), None)
        .await
        .unwrap();
    h.ledger
        .return_asset(asset.id, date(2024, 2, 1), None)
        .await
        .unwrap();

    let log = h.effects.service_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].date, date(2024, 1, 1));
    assert!(log[0].description.contains("allocated"));
    assert_eq!(log[1].date, date(2024, 2, 1));
    assert!(log[1].description.contains("returned"));

    let kinds: Vec<_> = h.effects.notifications().iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![NotificationType::AssetAllocated, NotificationType::AssetReturned]
    );
}

#[tokio::test]
async fn failing_side_effects_do_not_affect_transitions() {
    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let user = h.active_user("U1");
    h.effects.set_failing(true);

    let allocation = h
        .ledger
        .allocate(asset.id, user, date(2024, 1, 1), None)
        .await
        .unwrap();
    assert_eq!(h.status_of(asset.id).await, AssetStatus::Allocated);

    h.ledger.request_return(asset.id, None).await.unwrap();

    let returned = h
        .ledger
        .return_asset(asset.id, date(2024, 2, 1), None)
        .await
        .unwrap();
    assert_eq!(returned.id, allocation.id);
    assert_eq!(h.status_of(asset.id).await, AssetStatus::Available);
    assert!(h.effects.service_log().is_empty());
    assert!(h.effects.notifications().is_empty());
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_allocations_admit_exactly_one_winner() {
    const CALLERS: usize = 16;

    let h = harness();
    let asset = h.laptop("A001", "Dell Latitude").await;
    let users: Vec<_> = (0..CALLERS)
        .map(|i| h.active_user(&format!("U{i}")))
        .collect();

    let mut handles = Vec::with_capacity(CALLERS);
    for user in users {
        let ledger = Arc::clone(&h.ledger);
        handles.push(tokio::spawn(async move {
            ledger.allocate(asset.id, user, date(2024, 1, 1), None).await
        }));
    }

    let mut wins = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(CoreError::AssetNotAvailable { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(conflicts, CALLERS - 1);
    assert_eq!(h.store.allocation_count(asset.id), 1);
    h.assert_invariant(asset.id).await;
}

