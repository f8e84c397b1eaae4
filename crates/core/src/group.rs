//! Allocate "any one" asset out of a named group.
//!
//! Selection reads the store and picks the lowest-id `AVAILABLE` asset whose
//! name matches the group. The atomic status check inside
//! [`AllocationLedger::allocate`] is what actually prevents double
//! allocation; when the chosen candidate loses that race the selection is
//! repeated.

use std::sync::Arc;

use crate::allocation::Allocation;
use crate::asset::Asset;
use crate::error::{CoreError, CoreResult};
use crate::filter::AssetFilter;
use crate::ledger::AllocationLedger;
use crate::ports::AssetStore;
use crate::status::AssetStatus;
use crate::types::DbId;

/// Default number of select-then-allocate rounds.
pub const DEFAULT_GROUP_ALLOCATION_ATTEMPTS: usize = 3;

pub struct GroupAllocator {
    assets: Arc<dyn AssetStore>,
    ledger: Arc<AllocationLedger>,
    max_attempts: usize,
}

impl GroupAllocator {
    pub fn new(assets: Arc<dyn AssetStore>, ledger: Arc<AllocationLedger>) -> Self {
        Self {
            assets,
            ledger,
            max_attempts: DEFAULT_GROUP_ALLOCATION_ATTEMPTS,
        }
    }

    /// Override the number of rounds. Values below one are treated as one.
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Allocate the first available asset of `group_name` to `user_id`, dated today.
    pub async fn allocate_from_group(
        &self,
        group_name: &str,
        user_id: DbId,
        remarks: Option<String>,
    ) -> CoreResult<Allocation> {
        let group_name = group_name.trim();
        if group_name.is_empty() {
            return Err(CoreError::Validation("Group name must not be empty".into()));
        }

        let filter = AssetFilter::new()
            .name_equals(group_name)
            .status(AssetStatus::Available);

        let mut last_conflict = None;
        for attempt in 1..=self.max_attempts {
            let candidates = self.assets.search(&filter).await?;
            let Some(candidate) = select_candidate(&candidates, group_name) else {
                return Err(CoreError::InvalidOperation(format!(
                    "No available asset in group '{group_name}'"
                )));
            };

            match self
                .ledger
                .allocate(candidate.id, user_id, self.ledger.today(), remarks.clone())
                .await
            {
                Ok(allocation) => return Ok(allocation),
                Err(err @ CoreError::AssetNotAvailable { .. }) => {
                    tracing::warn!(
                        group = group_name,
                        asset_id = candidate.id,
                        attempt,
                        "Group candidate was taken concurrently, reselecting"
                    );
                    last_conflict = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_conflict.unwrap_or_else(|| {
            CoreError::InvalidOperation(format!("No available asset in group '{group_name}'"))
        }))
    }
}

/// Lowest-id `AVAILABLE` asset whose name equals `group_name` (case-insensitive).
pub fn select_candidate<'a>(candidates: &'a [Asset], group_name: &str) -> Option<&'a Asset> {
    let filter = AssetFilter::new()
        .name_equals(group_name)
        .status(AssetStatus::Available);
    candidates
        .iter()
        .filter(|a| filter.matches(a))
        .min_by_key(|a| a.id)
}
