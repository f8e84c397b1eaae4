//! Enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table, and its label matches the `name`
//! column of that table.

use std::fmt;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant = $val ),+
        }

        impl $name {
            /// Every variant, in discriminant order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database lookup ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database lookup ID back to the enum.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// The canonical upper-case label.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// Parse a label, ignoring ASCII case and surrounding whitespace.
            pub fn parse(label: &str) -> Option<Self> {
                let label = label.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(label))
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Availability status of an asset.
    AssetStatus {
        Available = 1 => "AVAILABLE",
        Allocated = 2 => "ALLOCATED",
        Maintenance = 3 => "MAINTENANCE",
        Retired = 4 => "RETIRED",
        Lost = 5 => "LOST",
    }
}

define_status_enum! {
    /// Top-level asset classification.
    AssetCategory {
        Hardware = 1 => "HARDWARE",
        Software = 2 => "SOFTWARE",
        Accessories = 3 => "ACCESSORIES",
    }
}

define_status_enum! {
    /// Concrete asset type. Every type belongs to exactly one category.
    AssetType {
        Laptop = 1 => "LAPTOP",
        Desktop = 2 => "DESKTOP",
        Monitor = 3 => "MONITOR",
        Server = 4 => "SERVER",
        Printer = 5 => "PRINTER",
        Phone = 6 => "PHONE",
        Tablet = 7 => "TABLET",
        License = 8 => "LICENSE",
        Subscription = 9 => "SUBSCRIPTION",
        Keyboard = 10 => "KEYBOARD",
        Mouse = 11 => "MOUSE",
        Headset = 12 => "HEADSET",
        DockingStation = 13 => "DOCKING_STATION",
        Cable = 14 => "CABLE",
    }
}

define_status_enum! {
    /// Lifecycle of a single allocation row.
    ///
    /// Only `Returned` rows carry a `returned_date`; the other three are the
    /// sub-states of an active allocation.
    AllocationState {
        Active = 1 => "ACTIVE",
        ReturnRequested = 2 => "RETURN_REQUESTED",
        ReturnAcknowledged = 3 => "RETURN_ACKNOWLEDGED",
        Returned = 4 => "RETURNED",
    }
}

define_status_enum! {
    /// Account status reported by the user directory.
    UserStatus {
        Active = 1 => "ACTIVE",
        Inactive = 2 => "INACTIVE",
    }
}

impl AssetType {
    /// The category this type is filed under.
    pub fn category(self) -> AssetCategory {
        match self {
            AssetType::Laptop
            | AssetType::Desktop
            | AssetType::Monitor
            | AssetType::Server
            | AssetType::Printer
            | AssetType::Phone
            | AssetType::Tablet => AssetCategory::Hardware,
            AssetType::License | AssetType::Subscription => AssetCategory::Software,
            AssetType::Keyboard
            | AssetType::Mouse
            | AssetType::Headset
            | AssetType::DockingStation
            | AssetType::Cable => AssetCategory::Accessories,
        }
    }
}

impl AssetStatus {
    /// Statuses an administrator may set directly. `Allocated` is owned by
    /// the allocation ledger.
    pub fn is_administrative(self) -> bool {
        !matches!(self, AssetStatus::Allocated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_lookup() {
        for status in AssetStatus::ALL {
            assert_eq!(AssetStatus::from_id(status.id()), Some(*status));
        }
        assert_eq!(AssetStatus::from_id(0), None);
        assert_eq!(AssetStatus::from_id(6), None);
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(AssetStatus::parse("available"), Some(AssetStatus::Available));
        assert_eq!(
            AssetType::parse(" docking_station "),
            Some(AssetType::DockingStation)
        );
        assert_eq!(AllocationState::parse("bogus"), None);
    }

    #[test]
    fn serde_uses_upper_case_labels() {
        let json = serde_json::to_string(&AllocationState::ReturnRequested).unwrap();
        assert_eq!(json, "\"RETURN_REQUESTED\"");
        let back: AssetStatus = serde_json::from_str("\"LOST\"").unwrap();
        assert_eq!(back, AssetStatus::Lost);
    }

    #[test]
    fn every_type_maps_to_its_category() {
        assert_eq!(AssetType::Laptop.category(), AssetCategory::Hardware);
        assert_eq!(AssetType::License.category(), AssetCategory::Software);
        assert_eq!(AssetType::Mouse.category(), AssetCategory::Accessories);
    }

    #[test]
    fn allocated_is_not_administrative() {
        assert!(!AssetStatus::Allocated.is_administrative());
        assert!(AssetStatus::Maintenance.is_administrative());
        assert!(AssetStatus::Available.is_administrative());
    }
}
