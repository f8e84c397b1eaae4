//! Notification kinds and the side-effect payloads emitted by the ledger.

use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::types::{Date, DbId};

/// Fixed set of notification kinds understood by the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    AssetAllocated,
    AssetReturned,
    Warning,
    IssueReported,
    IssueResolved,
    WarrantyExpiring,
    Info,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::AssetAllocated => "ASSET_ALLOCATED",
            NotificationType::AssetReturned => "ASSET_RETURNED",
            NotificationType::Warning => "WARNING",
            NotificationType::IssueReported => "ISSUE_REPORTED",
            NotificationType::IssueResolved => "ISSUE_RESOLVED",
            NotificationType::WarrantyExpiring => "WARRANTY_EXPIRING",
            NotificationType::Info => "INFO",
        }
    }
}

/// A notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub user_id: DbId,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub related_issue_id: Option<DbId>,
    pub related_asset_id: Option<DbId>,
}

/// One line in an asset's service log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLogEntry {
    pub asset_id: DbId,
    pub date: Date,
    pub description: String,
}

pub fn allocated_notification(asset: &Asset, user_id: DbId) -> NotificationRequest {
    NotificationRequest {
        user_id,
        title: "Asset allocated".into(),
        message: format!(
            "Asset {} ({}) has been allocated to you.",
            asset.tag, asset.name
        ),
        kind: NotificationType::AssetAllocated,
        related_issue_id: None,
        related_asset_id: Some(asset.id),
    }
}

pub fn returned_notification(asset: &Asset, user_id: DbId) -> NotificationRequest {
    NotificationRequest {
        user_id,
        title: "Asset returned".into(),
        message: format!(
            "Return of asset {} ({}) has been recorded.",
            asset.tag, asset.name
        ),
        kind: NotificationType::AssetReturned,
        related_issue_id: None,
        related_asset_id: Some(asset.id),
    }
}

pub fn return_requested_notification(
    asset: &Asset,
    user_id: DbId,
    remarks: Option<&str>,
) -> NotificationRequest {
    let mut message = format!(
        "Please return asset {} ({}).",
        asset.tag, asset.name
    );
    if let Some(r) = remarks.map(str::trim).filter(|r| !r.is_empty()) {
        message.push_str(&format!(" Reason: {r}"));
    }
    NotificationRequest {
        user_id,
        title: "Return requested".into(),
        message,
        kind: NotificationType::Warning,
        related_issue_id: None,
        related_asset_id: Some(asset.id),
    }
}

pub fn allocation_log_entry(asset: &Asset, user_id: DbId, date: Date) -> ServiceLogEntry {
    ServiceLogEntry {
        asset_id: asset.id,
        date,
        description: format!("Asset {} allocated to user {user_id}", asset.tag),
    }
}

pub fn return_log_entry(asset: &Asset, user_id: DbId, date: Date) -> ServiceLogEntry {
    ServiceLogEntry {
        asset_id: asset.id,
        date,
        description: format!("Asset {} returned by user {user_id}", asset.tag),
    }
}
