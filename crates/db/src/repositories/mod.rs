//! One repository per table. Each is a unit struct with async functions
//! taking a `&PgPool`.

pub mod allocation_repo;
pub mod asset_repo;
pub mod notification_repo;
pub mod service_log_repo;
pub mod user_repo;
pub mod vendor_repo;
pub mod warranty_history_repo;

pub use allocation_repo::{AllocationRepo, OpenOutcome};
pub use asset_repo::{AssetDeletion, AssetRepo};
pub use notification_repo::NotificationRepo;
pub use service_log_repo::ServiceLogRepo;
pub use user_repo::UserRepo;
pub use vendor_repo::VendorRepo;
pub use warranty_history_repo::WarrantyHistoryRepo;
