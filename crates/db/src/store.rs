//! PostgreSQL implementation of the core collaborator ports.

use assetrack_core::allocation::{Allocation, HandshakeChange, NewAllocation};
use assetrack_core::asset::{Asset, AssetUpdate, NewAsset};
use assetrack_core::error::{CoreError, CoreResult};
use assetrack_core::filter::AssetFilter;
use assetrack_core::notification::{NotificationRequest, ServiceLogEntry};
use assetrack_core::ports::{
    AllocationStore, AssetRevision, AssetStore, NotificationSink, ServiceLog, UserDirectory,
    UserRecord, VendorDirectory, VendorRecord, WarrantyAuditLog,
};
use assetrack_core::status::{AllocationState, AssetStatus};
use assetrack_core::types::{Date, DbId};
use assetrack_core::warranty::{WarrantyChange, WarrantyHistoryEntry};
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{
    is_foreign_key_violation, is_unique_violation, map_db_error, ACTIVE_ALLOCATION_CONSTRAINT,
};
use crate::models::allocation::AllocationRow;
use crate::repositories::{
    AllocationRepo, AssetDeletion, AssetRepo, NotificationRepo, OpenOutcome, ServiceLogRepo,
    UserRepo, VendorRepo, WarrantyHistoryRepo,
};

/// Every core port backed by one connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn to_allocations(rows: Vec<AllocationRow>) -> CoreResult<Vec<Allocation>> {
    rows.into_iter().map(Allocation::try_from).collect()
}

#[async_trait]
impl AssetStore for PgStore {
    async fn get(&self, id: DbId) -> CoreResult<Option<Asset>> {
        AssetRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)?
            .map(Asset::try_from)
            .transpose()
    }

    async fn get_by_tag(&self, tag: &str) -> CoreResult<Option<Asset>> {
        AssetRepo::find_by_tag(&self.pool, tag)
            .await
            .map_err(map_db_error)?
            .map(Asset::try_from)
            .transpose()
    }

    async fn create(&self, input: &NewAsset) -> CoreResult<Asset> {
        let row = AssetRepo::create(&self.pool, input)
            .await
            .map_err(map_db_error)?;
        Asset::try_from(row)
    }

    async fn update(&self, id: DbId, patch: &AssetUpdate) -> CoreResult<Option<AssetRevision>> {
        let Some((before, after)) = AssetRepo::update(&self.pool, id, patch)
            .await
            .map_err(map_db_error)?
        else {
            return Ok(None);
        };
        Ok(Some(AssetRevision {
            before: Asset::try_from(before)?,
            after: Asset::try_from(after)?,
        }))
    }

    async fn update_status(&self, id: DbId, status: AssetStatus) -> CoreResult<Option<Asset>> {
        AssetRepo::update_status(&self.pool, id, status.id())
            .await
            .map_err(map_db_error)?
            .map(Asset::try_from)
            .transpose()
    }

    async fn transition_status(
        &self,
        id: DbId,
        expected: AssetStatus,
        next: AssetStatus,
    ) -> CoreResult<Option<Asset>> {
        AssetRepo::transition_status(&self.pool, id, expected.id(), next.id())
            .await
            .map_err(map_db_error)?
            .map(Asset::try_from)
            .transpose()
    }

    async fn delete(&self, id: DbId) -> CoreResult<()> {
        match AssetRepo::delete(&self.pool, id)
            .await
            .map_err(map_db_error)?
        {
            AssetDeletion::Deleted => Ok(()),
            AssetDeletion::NotFound => Err(CoreError::asset_not_found(id)),
            AssetDeletion::Allocated => Err(CoreError::InvalidOperation(format!(
                "Asset {id} is allocated and cannot be deleted"
            ))),
            AssetDeletion::HasAllocationHistory => Err(CoreError::InvalidOperation(format!(
                "Asset {id} has allocation history and cannot be deleted"
            ))),
            AssetDeletion::HasWarrantyHistory => Err(CoreError::InvalidOperation(format!(
                "Asset {id} has warranty history and cannot be deleted"
            ))),
        }
    }

    async fn search(&self, filter: &AssetFilter) -> CoreResult<Vec<Asset>> {
        AssetRepo::search(&self.pool, filter)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(Asset::try_from)
            .collect()
    }
}

#[async_trait]
impl AllocationStore for PgStore {
    async fn open(&self, input: &NewAllocation) -> CoreResult<Allocation> {
        let outcome = match AllocationRepo::open(&self.pool, input).await {
            Ok(outcome) => outcome,
            Err(e) if is_unique_violation(&e, ACTIVE_ALLOCATION_CONSTRAINT) => {
                return Err(CoreError::AssetNotAvailable {
                    asset_id: input.asset_id,
                    status: AssetStatus::Allocated,
                });
            }
            Err(e) if is_foreign_key_violation(&e) => {
                return Err(CoreError::user_not_found(input.user_id));
            }
            Err(e) => return Err(map_db_error(e)),
        };

        match outcome {
            OpenOutcome::Opened(row) => Allocation::try_from(row),
            OpenOutcome::AssetMissing => Err(CoreError::asset_not_found(input.asset_id)),
            OpenOutcome::Unavailable(status_id) => {
                let status = AssetStatus::from_id(status_id).ok_or_else(|| {
                    CoreError::Internal(format!("Unknown asset_statuses id {status_id}"))
                })?;
                Err(CoreError::AssetNotAvailable {
                    asset_id: input.asset_id,
                    status,
                })
            }
        }
    }

    async fn close(
        &self,
        allocation_id: DbId,
        returned_date: Date,
        remarks: Option<String>,
    ) -> CoreResult<Option<Allocation>> {
        AllocationRepo::close(&self.pool, allocation_id, returned_date, remarks.as_deref())
            .await
            .map_err(map_db_error)?
            .map(Allocation::try_from)
            .transpose()
    }

    async fn apply_handshake(
        &self,
        allocation_id: DbId,
        expected: AllocationState,
        change: &HandshakeChange,
    ) -> CoreResult<Option<Allocation>> {
        AllocationRepo::apply_handshake(
            &self.pool,
            allocation_id,
            expected,
            change.state,
            change.request.as_ref(),
        )
        .await
        .map_err(map_db_error)?
        .map(Allocation::try_from)
        .transpose()
    }

    async fn find_active(&self, asset_id: DbId) -> CoreResult<Option<Allocation>> {
        AllocationRepo::find_active(&self.pool, asset_id)
            .await
            .map_err(map_db_error)?
            .map(Allocation::try_from)
            .transpose()
    }

    async fn list_for_asset(&self, asset_id: DbId) -> CoreResult<Vec<Allocation>> {
        let rows = AllocationRepo::list_by_asset(&self.pool, asset_id)
            .await
            .map_err(map_db_error)?;
        to_allocations(rows)
    }

    async fn list_for_user(&self, user_id: DbId, active_only: bool) -> CoreResult<Vec<Allocation>> {
        let rows = AllocationRepo::list_by_user(&self.pool, user_id, active_only)
            .await
            .map_err(map_db_error)?;
        to_allocations(rows)
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn get(&self, user_id: DbId) -> CoreResult<Option<UserRecord>> {
        UserRepo::find_by_id(&self.pool, user_id)
            .await
            .map_err(map_db_error)?
            .map(UserRecord::try_from)
            .transpose()
    }
}

#[async_trait]
impl VendorDirectory for PgStore {
    async fn get(&self, vendor_id: DbId) -> CoreResult<Option<VendorRecord>> {
        Ok(VendorRepo::find_by_id(&self.pool, vendor_id)
            .await
            .map_err(map_db_error)?
            .map(VendorRecord::from))
    }
}

#[async_trait]
impl WarrantyAuditLog for PgStore {
    async fn record(&self, change: &WarrantyChange) -> CoreResult<WarrantyHistoryEntry> {
        match WarrantyHistoryRepo::create(&self.pool, change).await {
            Ok(row) => Ok(row.into()),
            Err(e) if is_foreign_key_violation(&e) => {
                Err(CoreError::asset_not_found(change.asset_id))
            }
            Err(e) => Err(map_db_error(e)),
        }
    }

    async fn history(&self, asset_id: DbId) -> CoreResult<Vec<WarrantyHistoryEntry>> {
        Ok(WarrantyHistoryRepo::list_by_asset(&self.pool, asset_id)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(WarrantyHistoryEntry::from)
            .collect())
    }
}

#[async_trait]
impl ServiceLog for PgStore {
    async fn append(&self, entry: &ServiceLogEntry) -> CoreResult<()> {
        ServiceLogRepo::create(&self.pool, entry)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for PgStore {
    async fn notify(&self, notification: &NotificationRequest) -> CoreResult<()> {
        NotificationRepo::create(&self.pool, notification)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}
