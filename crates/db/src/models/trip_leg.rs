use chrono::NaiveDate;
use fleetlog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `trip_legs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TripLeg {
    pub id: DbId,
    pub data_entry_date: NaiveDate,
    pub vehicle_id: String,
    pub activity_date: NaiveDate,
    pub trip_id: String,
    pub custodian_name: String,
    pub driver_name: String,
    pub branch_name: String,
    pub sol_id: String,
    pub cluster: String,
    pub circle: String,
    pub client: String,
    pub trip_retrieval_count: i32,
    pub trip_fresh_pickup_count: i32,
    pub trip_return_retrieval_count: i32,
    pub trip_empty_boxes_delivered_count: i32,
    pub trip_opening_kms: i64,
    pub trip_closing_kms: i64,
    pub trip_kms: i64,
    pub remarks: String,
    pub trip_branch_count: i64,
    pub branch_kms: f64,
    pub transaction_id: String,
    pub created_at: Timestamp,
}

/// Result of appending one trip save.
#[derive(Debug, Clone, Serialize)]
pub struct SavedTrip {
    pub trip_id: String,
    /// Legs already stored for the trip before this save.
    pub prior_legs: i64,
    pub total_legs: i64,
    pub branch_kms: f64,
    pub legs: Vec<TripLeg>,
}
