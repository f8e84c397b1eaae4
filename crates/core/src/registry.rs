//! Administrative asset operations: registration, updates, deletion,
//! status overrides, and the warranty audit trail they produce.
//!
//! Warranty audit rows are written after the asset write commits. A failed
//! audit write is logged and does not fail the asset operation.

use std::sync::Arc;

use serde::Serialize;

use crate::asset::{self, Asset, AssetUpdate, NewAsset};
use crate::clock::Clock;
use crate::depreciation;
use crate::error::{CoreError, CoreResult};
use crate::filter::AssetFilter;
use crate::ports::{AssetStore, VendorDirectory, WarrantyAuditLog};
use crate::status::AssetStatus;
use crate::types::DbId;
use crate::warranty::{self, WarrantyChange, WarrantyHistoryEntry};

/// Collaborators wired into an [`AssetRegistry`].
#[derive(Clone)]
pub struct RegistryPorts {
    pub assets: Arc<dyn AssetStore>,
    pub warranty: Arc<dyn WarrantyAuditLog>,
    pub vendors: Arc<dyn VendorDirectory>,
    pub clock: Arc<dyn Clock>,
}

/// An asset enriched for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct AssetView {
    #[serde(flatten)]
    pub asset: Asset,
    pub vendor_name: Option<String>,
    pub book_value: f64,
}

pub struct AssetRegistry {
    ports: RegistryPorts,
}

impl AssetRegistry {
    pub fn new(ports: RegistryPorts) -> Self {
        Self { ports }
    }

    /// Register a new asset in `AVAILABLE` status.
    pub async fn create(&self, input: &NewAsset) -> CoreResult<Asset> {
        asset::validate_new_asset(input)?;
        if self.ports.assets.get_by_tag(&input.tag).await?.is_some() {
            return Err(CoreError::Duplicate(format!(
                "Asset tag '{}' already exists",
                input.tag
            )));
        }

        let created = self.ports.assets.create(input).await?;
        tracing::info!(asset_id = created.id, tag = %created.tag, "Asset registered");

        if let Some(change) = warranty::change_on_create(created.id, created.warranty_expiry_date) {
            self.record_warranty(change).await;
        }
        Ok(created)
    }

    /// Apply a descriptive update. A changed warranty date appends an audit row
    /// carrying `reason` (or a default reason).
    pub async fn update(
        &self,
        id: DbId,
        patch: &AssetUpdate,
        reason: Option<&str>,
    ) -> CoreResult<Asset> {
        let current = self.get(id).await?;
        asset::validate_updated_asset(&patch.apply_to(&current))?;

        let revision = self
            .ports
            .assets
            .update(id, patch)
            .await?
            .ok_or_else(|| CoreError::asset_not_found(id))?;
        tracing::info!(asset_id = id, "Asset updated");

        if let Some(change) = warranty::change_on_update(
            id,
            revision.before.warranty_expiry_date,
            revision.after.warranty_expiry_date,
            reason,
        ) {
            self.record_warranty(change).await;
        }
        Ok(revision.after)
    }

    /// Delete an asset that has never been allocated and has no warranty history.
    pub async fn delete(&self, id: DbId) -> CoreResult<()> {
        self.ports.assets.delete(id).await?;
        tracing::info!(asset_id = id, "Asset deleted");
        Ok(())
    }

    /// Administrative status override between AVAILABLE, MAINTENANCE,
    /// RETIRED and LOST. ALLOCATED is reachable only through the ledger.
    pub async fn set_status(&self, id: DbId, status: AssetStatus) -> CoreResult<Asset> {
        if !status.is_administrative() {
            return Err(CoreError::InvalidOperation(
                "ALLOCATED can only be set by allocating the asset".into(),
            ));
        }
        let current = self.get(id).await?;
        if current.status == AssetStatus::Allocated {
            return Err(CoreError::InvalidOperation(format!(
                "Asset {id} is allocated; return it before changing its status"
            )));
        }
        if current.status == status {
            return Ok(current);
        }

        let updated = self
            .ports
            .assets
            .transition_status(id, current.status, status)
            .await?
            .ok_or_else(|| {
                CoreError::InvalidOperation(format!(
                    "Asset {id} changed status concurrently; retry the override"
                ))
            })?;
        tracing::info!(
            asset_id = id,
            from = %current.status,
            to = %status,
            "Asset status overridden"
        );
        Ok(updated)
    }

    pub async fn get(&self, id: DbId) -> CoreResult<Asset> {
        self.ports
            .assets
            .get(id)
            .await?
            .ok_or_else(|| CoreError::asset_not_found(id))
    }

    pub async fn get_by_tag(&self, tag: &str) -> CoreResult<Asset> {
        self.ports
            .assets
            .get_by_tag(tag)
            .await?
            .ok_or_else(|| CoreError::NotFoundByKey {
                entity: "Asset",
                key: tag.to_string(),
            })
    }

    pub async fn search(&self, filter: &AssetFilter) -> CoreResult<Vec<Asset>> {
        self.ports.assets.search(filter).await
    }

    /// Asset plus resolved vendor name and current book value.
    pub async fn describe(&self, id: DbId) -> CoreResult<AssetView> {
        let asset = self.get(id).await?;
        let vendor_name = match asset.vendor_id {
            Some(vendor_id) => self
                .ports
                .vendors
                .get(vendor_id)
                .await?
                .map(|v| v.name),
            None => None,
        };
        let book_value = depreciation::book_value(
            asset.cost,
            asset.useful_life_years,
            asset.purchase_date,
            self.ports.clock.today(),
        );
        Ok(AssetView {
            asset,
            vendor_name,
            book_value,
        })
    }

    /// Warranty audit rows for an asset, newest first.
    pub async fn warranty_history(&self, id: DbId) -> CoreResult<Vec<WarrantyHistoryEntry>> {
        self.get(id).await?;
        self.ports.warranty.history(id).await
    }

    async fn record_warranty(&self, change: WarrantyChange) {
        if let Err(e) = self.ports.warranty.record(&change).await {
            tracing::warn!(
                error = %e,
                asset_id = change.asset_id,
                "Failed to record warranty change"
            );
        }
    }
}
