//! Asset entity and its input DTOs.
//!
//! The tag is the immutable business key. Vendors are referenced by id only;
//! the vendor name is resolved on demand through
//! [`VendorDirectory`](crate::ports::VendorDirectory).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::{AssetCategory, AssetStatus, AssetType};
use crate::types::{Date, DbId, Timestamp};

/// Maximum length of an asset tag.
pub const MAX_TAG_LEN: usize = 64;

/// Maximum length of an asset name.
pub const MAX_NAME_LEN: usize = 200;

/// A tracked item of hardware, software license, or accessory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: DbId,
    pub tag: String,
    pub name: String,
    pub category: AssetCategory,
    pub asset_type: AssetType,
    pub status: AssetStatus,
    pub cost: f64,
    pub useful_life_years: i32,
    pub purchase_date: Date,
    pub warranty_expiry_date: Option<Date>,
    pub vendor_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for registering a new asset. New assets always start `AVAILABLE`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAsset {
    pub tag: String,
    pub name: String,
    pub category: AssetCategory,
    pub asset_type: AssetType,
    pub cost: f64,
    pub useful_life_years: i32,
    pub purchase_date: Date,
    pub warranty_expiry_date: Option<Date>,
    pub vendor_id: Option<DbId>,
}

/// Partial update of an asset's descriptive fields.
///
/// Status is deliberately absent: it moves only through the allocation
/// ledger or [`AssetRegistry::set_status`](crate::registry::AssetRegistry::set_status).
/// `warranty_expiry_date` is doubly optional so callers can clear it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub category: Option<AssetCategory>,
    pub asset_type: Option<AssetType>,
    pub cost: Option<f64>,
    pub useful_life_years: Option<i32>,
    pub purchase_date: Option<Date>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub warranty_expiry_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub vendor_id: Option<Option<DbId>>,
}

impl AssetUpdate {
    /// Apply the patch to a copy of `asset`.
    pub fn apply_to(&self, asset: &Asset) -> Asset {
        let mut next = asset.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(category) = self.category {
            next.category = category;
        }
        if let Some(asset_type) = self.asset_type {
            next.asset_type = asset_type;
        }
        if let Some(cost) = self.cost {
            next.cost = cost;
        }
        if let Some(years) = self.useful_life_years {
            next.useful_life_years = years;
        }
        if let Some(date) = self.purchase_date {
            next.purchase_date = date;
        }
        if let Some(warranty) = self.warranty_expiry_date {
            next.warranty_expiry_date = warranty;
        }
        if let Some(vendor) = self.vendor_id {
            next.vendor_id = vendor;
        }
        next
    }
}

/// Validate the tag: non-empty, bounded, no whitespace.
pub fn validate_tag(tag: &str) -> Result<(), CoreError> {
    if tag.trim().is_empty() {
        return Err(CoreError::Validation("Asset tag must not be empty".into()));
    }
    if tag.len() > MAX_TAG_LEN {
        return Err(CoreError::Validation(format!(
            "Asset tag exceeds {MAX_TAG_LEN} characters"
        )));
    }
    if tag.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(format!(
            "Asset tag '{tag}' must not contain whitespace"
        )));
    }
    Ok(())
}

/// Check that `asset_type` is filed under `category`.
pub fn validate_type_for_category(
    category: AssetCategory,
    asset_type: AssetType,
) -> Result<(), CoreError> {
    if asset_type.category() != category {
        return Err(CoreError::Validation(format!(
            "Asset type {asset_type} does not belong to category {category}"
        )));
    }
    Ok(())
}

/// Validate the descriptive fields shared by create and update.
fn validate_fields(
    name: &str,
    category: AssetCategory,
    asset_type: AssetType,
    cost: f64,
    useful_life_years: i32,
) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Asset name must not be empty".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Asset name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    if !cost.is_finite() || cost < 0.0 {
        return Err(CoreError::Validation(
            "Asset cost must be a non-negative number".into(),
        ));
    }
    if useful_life_years < 0 {
        return Err(CoreError::Validation(
            "Useful life must not be negative".into(),
        ));
    }
    validate_type_for_category(category, asset_type)
}

/// Validate a registration request.
pub fn validate_new_asset(input: &NewAsset) -> Result<(), CoreError> {
    validate_tag(&input.tag)?;
    validate_fields(
        &input.name,
        input.category,
        input.asset_type,
        input.cost,
        input.useful_life_years,
    )
}

/// Validate the result of applying an update.
pub fn validate_updated_asset(asset: &Asset) -> Result<(), CoreError> {
    validate_fields(
        &asset.name,
        asset.category,
        asset.asset_type,
        asset.cost,
        asset.useful_life_years,
    )
}

/// Serde helper distinguishing an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, Utc};

    fn laptop() -> Asset {
        Asset {
            id: 1,
            tag: "A001".into(),
            name: "Dell Latitude".into(),
            category: AssetCategory::Hardware,
            asset_type: AssetType::Laptop,
            status: AssetStatus::Available,
            cost: 1200.0,
            useful_life_years: 4,
            purchase_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            warranty_expiry_date: None,
            vendor_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn tag_rules() {
        assert!(validate_tag("A-001").is_ok());
        assert_matches!(validate_tag("  "), Err(CoreError::Validation(_)));
        assert_matches!(validate_tag("A 001"), Err(CoreError::Validation(_)));
        assert_matches!(
            validate_tag(&"x".repeat(MAX_TAG_LEN + 1)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn type_must_match_category() {
        assert!(validate_type_for_category(AssetCategory::Software, AssetType::License).is_ok());
        let err = validate_type_for_category(AssetCategory::Software, AssetType::Laptop)
            .unwrap_err()
            .to_string();
        assert!(err.contains("LAPTOP"));
        assert!(err.contains("SOFTWARE"));
    }

    #[test]
    fn negative_cost_rejected() {
        let mut asset = laptop();
        asset.cost = -1.0;
        assert_matches!(validate_updated_asset(&asset), Err(CoreError::Validation(_)));
    }

    #[test]
    fn patch_leaves_untouched_fields_alone() {
        let asset = laptop();
        let patch = AssetUpdate {
            name: Some("Dell Latitude 7440".into()),
            ..Default::default()
        };
        let next = patch.apply_to(&asset);
        assert_eq!(next.name, "Dell Latitude 7440");
        assert_eq!(next.tag, asset.tag);
        assert_eq!(next.cost, asset.cost);
        assert_eq!(next.warranty_expiry_date, None);
    }

    #[test]
    fn patch_can_clear_warranty() {
        let mut asset = laptop();
        asset.warranty_expiry_date = NaiveDate::from_ymd_opt(2026, 1, 1);
        let patch = AssetUpdate {
            warranty_expiry_date: Some(None),
            ..Default::default()
        };
        assert_eq!(patch.apply_to(&asset).warranty_expiry_date, None);
    }

    #[test]
    fn explicit_null_deserializes_as_clear() {
        let patch: AssetUpdate =
            serde_json::from_str(r#"{"warranty_expiry_date": null}"#).unwrap();
        assert_eq!(patch.warranty_expiry_date, Some(None));

        let patch: AssetUpdate = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(patch.warranty_expiry_date, None);
    }
}
