//! Composable asset predicates over a fixed field set.
//!
//! The in-memory store evaluates [`AssetFilter::matches`] directly; the
//! PostgreSQL repository translates the same fields into a `WHERE` clause.

use serde::Deserialize;

use crate::asset::Asset;
use crate::status::{AssetCategory, AssetStatus, AssetType};
use crate::types::DbId;

/// Conjunction of optional field predicates. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssetFilter {
    pub category: Option<AssetCategory>,
    pub asset_type: Option<AssetType>,
    pub status: Option<AssetStatus>,
    /// Case-insensitive substring match on the name.
    pub name_contains: Option<String>,
    /// Case-insensitive exact match on the name (group membership).
    pub name_equals: Option<String>,
    pub vendor_id: Option<DbId>,
}

impl AssetFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: AssetCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn asset_type(mut self, asset_type: AssetType) -> Self {
        self.asset_type = Some(asset_type);
        self
    }

    pub fn status(mut self, status: AssetStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn name_contains(mut self, fragment: impl Into<String>) -> Self {
        self.name_contains = Some(fragment.into());
        self
    }

    pub fn name_equals(mut self, name: impl Into<String>) -> Self {
        self.name_equals = Some(name.into());
        self
    }

    pub fn vendor(mut self, vendor_id: DbId) -> Self {
        self.vendor_id = Some(vendor_id);
        self
    }

    /// Evaluate every set predicate against `asset`.
    pub fn matches(&self, asset: &Asset) -> bool {
        if self.category.is_some_and(|c| c != asset.category) {
            return false;
        }
        if self.asset_type.is_some_and(|t| t != asset.asset_type) {
            return false;
        }
        if self.status.is_some_and(|s| s != asset.status) {
            return false;
        }
        if self.vendor_id.is_some() && self.vendor_id != asset.vendor_id {
            return false;
        }
        if let Some(fragment) = &self.name_contains {
            let fragment = fragment.trim().to_lowercase();
            if !asset.name.to_lowercase().contains(&fragment) {
                return false;
            }
        }
        if let Some(name) = &self.name_equals {
            if name.trim().to_lowercase() != asset.name.trim().to_lowercase() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn asset(name: &str, status: AssetStatus) -> Asset {
        Asset {
            id: 1,
            tag: "T1".into(),
            name: name.into(),
            category: AssetCategory::Hardware,
            asset_type: AssetType::Laptop,
            status,
            cost: 1000.0,
            useful_life_years: 3,
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            warranty_expiry_date: None,
            vendor_id: Some(7),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(AssetFilter::new().matches(&asset("Anything", AssetStatus::Lost)));
    }

    #[test]
    fn predicates_are_conjunctive() {
        let filter = AssetFilter::new()
            .category(AssetCategory::Hardware)
            .status(AssetStatus::Available)
            .vendor(7);
        assert!(filter.matches(&asset("Dell Latitude", AssetStatus::Available)));
        assert!(!filter.matches(&asset("Dell Latitude", AssetStatus::Allocated)));
        assert!(!filter.clone().vendor(8).matches(&asset("Dell", AssetStatus::Available)));
    }

    #[test]
    fn name_equals_is_exact_but_case_insensitive() {
        let filter = AssetFilter::new().name_equals("dell latitude");
        assert!(filter.matches(&asset("Dell Latitude", AssetStatus::Available)));
        assert!(!filter.matches(&asset("Dell Latitude 7440", AssetStatus::Available)));
    }

    #[test]
    fn name_contains_is_substring() {
        let filter = AssetFilter::new().name_contains("LATI");
        assert!(filter.matches(&asset("Dell Latitude 7440", AssetStatus::Available)));
        assert!(!filter.matches(&asset("ThinkPad", AssetStatus::Available)));
    }
}
