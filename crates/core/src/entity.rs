//! Entity registry: the closed set of record kinds the service stores.
//!
//! Every code path that used to branch on a free-form table name goes
//! through [`EntityKind`] instead. Each kind knows its backing table, the
//! natural-key fields the duplicate guard enforces, its required parent
//! reference, and the column order of its spreadsheet export.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Column order of an exported trip-leg row. This is the export contract
/// and must stay field-for-field identical to the persisted leg shape.
pub const TRIP_LEG_COLUMNS: &[&str] = &[
    "id",
    "data_entry_date",
    "vehicle_id",
    "activity_date",
    "trip_id",
    "custodian_name",
    "driver_name",
    "branch_name",
    "sol_id",
    "cluster",
    "circle",
    "client",
    "trip_retrieval_count",
    "trip_fresh_pickup_count",
    "trip_return_retrieval_count",
    "trip_empty_boxes_delivered_count",
    "trip_opening_kms",
    "trip_closing_kms",
    "trip_kms",
    "remarks",
    "trip_branch_count",
    "branch_kms",
    "transaction_id",
];

const NAME_COLUMNS: &[&str] = &["id", "name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Client,
    Circle,
    Cluster,
    Branch,
    Vehicle,
    Custodian,
    Driver,
    User,
    TripLeg,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Client,
        EntityKind::Circle,
        EntityKind::Cluster,
        EntityKind::Branch,
        EntityKind::Vehicle,
        EntityKind::Custodian,
        EntityKind::Driver,
        EntityKind::User,
        EntityKind::TripLeg,
    ];

    /// Canonical tag used in URLs and request bodies.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Circle => "circle",
            Self::Cluster => "cluster",
            Self::Branch => "branch",
            Self::Vehicle => "vehicle",
            Self::Custodian => "custodian",
            Self::Driver => "driver",
            Self::User => "user",
            Self::TripLeg => "trip_leg",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Circle => "Circle",
            Self::Cluster => "Cluster",
            Self::Branch => "Branch",
            Self::Vehicle => "Vehicle",
            Self::Custodian => "Custodian",
            Self::Driver => "Driver",
            Self::User => "User",
            Self::TripLeg => "TripLeg",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            Self::Client => "clients",
            Self::Circle => "circles",
            Self::Cluster => "clusters",
            Self::Branch => "branches",
            Self::Vehicle => "vehicles",
            Self::Custodian => "custodians",
            Self::Driver => "drivers",
            Self::User => "users",
            Self::TripLeg => "trip_legs",
        }
    }

    /// Ordered natural-key fields. A single entry means a simple key.
    pub fn unique_key(self) -> &'static [&'static str] {
        match self {
            Self::Client | Self::Vehicle | Self::Custodian | Self::Driver => &["name"],
            Self::Circle => &["name", "client_id"],
            Self::Cluster => &["name", "circle_id"],
            Self::Branch => &["sol_id", "branch_name"],
            Self::User => &["email"],
            Self::TripLeg => &["transaction_id"],
        }
    }

    /// Field holding the parent reference in the client → circle → cluster →
    /// branch hierarchy.
    pub fn parent_field(self) -> Option<&'static str> {
        match self {
            Self::Circle => Some("client_id"),
            Self::Cluster => Some("circle_id"),
            Self::Branch => Some("cluster_id"),
            _ => None,
        }
    }

    /// Fields that must be present before the guard will look at the store:
    /// the key fields followed by the parent reference when it is not
    /// already part of the key.
    pub fn guarded_fields(self) -> Vec<&'static str> {
        let mut fields = self.unique_key().to_vec();
        if let Some(parent) = self.parent_field() {
            if !fields.contains(&parent) {
                fields.push(parent);
            }
        }
        fields
    }

    /// Trip legs are produced by the trip aggregator only.
    pub fn is_importable(self) -> bool {
        !matches!(self, Self::TripLeg)
    }

    /// Kinds the bulk delete endpoint accepts.
    pub fn is_deletable(self) -> bool {
        !matches!(self, Self::TripLeg)
    }

    /// Column order used for table export.
    pub fn export_columns(self) -> &'static [&'static str] {
        match self {
            Self::Client | Self::Vehicle | Self::Custodian | Self::Driver => NAME_COLUMNS,
            Self::Circle => &["id", "name", "client_id"],
            Self::Cluster => &["id", "name", "circle_id"],
            Self::Branch => &["id", "sol_id", "branch_name", "cluster_id"],
            Self::User => &["id", "name", "email", "role"],
            Self::TripLeg => TRIP_LEG_COLUMNS,
        }
    }

    /// Columns holding calendar dates (rendered `dd-mm-yyyy` on export).
    pub fn date_columns(self) -> &'static [&'static str] {
        match self {
            Self::TripLeg => &["data_entry_date", "activity_date"],
            _ => &[],
        }
    }

    /// Resolve a tag, accepting the legacy collection names.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        let kind = match tag.as_str() {
            "client" | "clients" => Self::Client,
            "circle" | "circles" => Self::Circle,
            "cluster" | "clusters" => Self::Cluster,
            "branch" | "branches" => Self::Branch,
            "vehicle" | "vehicles" => Self::Vehicle,
            "custodian" | "custodians" => Self::Custodian,
            "driver" | "drivers" => Self::Driver,
            "user" | "users" | "add_user" => Self::User,
            "trip_leg" | "trip_legs" | "kms_report" => Self::TripLeg,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid table name '{s}'. Must be one of: {}",
                Self::ALL.map(|k| k.tag()).join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.tag().parse::<EntityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn legacy_aliases_resolve() {
        assert_eq!(EntityKind::from_tag("add_user"), Some(EntityKind::User));
        assert_eq!(EntityKind::from_tag("KMS_REPORT"), Some(EntityKind::TripLeg));
        assert_eq!(EntityKind::from_tag(" Branch "), Some(EntityKind::Branch));
    }

    #[test]
    fn unknown_tag_is_a_validation_error() {
        let err = "activity_report".parse::<EntityKind>().unwrap_err();
        assert!(matches!(err, CoreError::Validation(msg) if msg.contains("activity_report")));
    }

    #[test]
    fn composite_keys_include_parent() {
        assert_eq!(EntityKind::Circle.unique_key(), &["name", "client_id"]);
        assert_eq!(EntityKind::Cluster.unique_key(), &["name", "circle_id"]);
        assert_eq!(EntityKind::Branch.unique_key(), &["sol_id", "branch_name"]);
    }

    #[test]
    fn guarded_fields_append_parent_once() {
        assert_eq!(EntityKind::Circle.guarded_fields(), vec!["name", "client_id"]);
        assert_eq!(
            EntityKind::Branch.guarded_fields(),
            vec!["sol_id", "branch_name", "cluster_id"]
        );
        assert_eq!(EntityKind::Vehicle.guarded_fields(), vec!["name"]);
    }

    #[test]
    fn trip_legs_are_neither_importable_nor_deletable() {
        assert!(!EntityKind::TripLeg.is_importable());
        assert!(!EntityKind::TripLeg.is_deletable());
        assert!(EntityKind::Branch.is_importable());
        assert!(EntityKind::User.is_deletable());
    }

    #[test]
    fn every_export_starts_with_id() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.export_columns()[0], "id");
        }
    }
}
