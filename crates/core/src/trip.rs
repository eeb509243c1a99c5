//! Trip aggregation: one logical trip expanded into per-branch leg rows.
//!
//! A trip is one vehicle's activity on one day. Its id is derived from the
//! vehicle and the activity date, so separate saves for the same vehicle and
//! day land on the same trip. Every save appends one leg per selected
//! branch; the running leg total and the per-leg distance are recomputed on
//! each save and written to the new legs only. Earlier legs keep whatever
//! `branch_kms` they were saved with.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::{deserialize_date, deserialize_optional_date, parse_date};
use crate::error::CoreError;
use crate::types::deserialize_lenient_number;

/// Separator between the trip id and the branch `sol_id` in a transaction id.
pub const TRANSACTION_ID_SEPARATOR: char = '/';

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

/// Derive the trip id for a vehicle on a day.
///
/// `{first char of vehicle, uppercased}{last 4 chars of vehicle}/{ddmmyy}`.
/// Returns `None` when the vehicle id is blank or the date is absent; the
/// caller must not save in that case.
///
/// ```
/// use chrono::NaiveDate;
/// use fleetlog_core::trip::derive_trip_id;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 7);
/// assert_eq!(derive_trip_id("MH12AB1234", date).as_deref(), Some("M1234/070324"));
/// assert_eq!(derive_trip_id("", date), None);
/// ```
pub fn derive_trip_id(vehicle_id: &str, activity_date: Option<NaiveDate>) -> Option<String> {
    let vehicle_id = vehicle_id.trim();
    let date = activity_date?;
    let first = vehicle_id.chars().next()?;

    let chars: Vec<char> = vehicle_id.chars().collect();
    let last4: String = chars[chars.len().saturating_sub(4)..].iter().collect();

    Some(format!(
        "{}{}/{:02}{:02}{:02}",
        first.to_uppercase(),
        last4,
        date.day(),
        date.month(),
        date.year().rem_euclid(100)
    ))
}

/// Same as [`derive_trip_id`] for a textual date; unparseable dates yield `None`.
pub fn derive_trip_id_from_text(vehicle_id: &str, activity_date: &str) -> Option<String> {
    derive_trip_id(vehicle_id, parse_date(activity_date).ok())
}

/// Distance covered by the trip; never negative.
pub fn trip_kms(opening_kms: i64, closing_kms: i64) -> i64 {
    closing_kms.saturating_sub(opening_kms).max(0)
}

/// Split `trip_kms` evenly across `total_legs`, rounded to 2 decimal places.
pub fn apportion_kms(trip_kms: i64, total_legs: i64) -> f64 {
    if total_legs <= 0 {
        return 0.0;
    }
    round2(trip_kms as f64 / total_legs as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn transaction_id(trip_id: &str, sol_id: &str) -> String {
    format!("{trip_id}{TRANSACTION_ID_SEPARATOR}{sol_id}")
}

// ---------------------------------------------------------------------------
// Draft (what the trip form submits)
// ---------------------------------------------------------------------------

/// One branch slot on the trip form.
///
/// The denormalized fields are the values captured when the branch was
/// selected; later renames in the catalog never rewrite them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BranchSelection {
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub sol_id: String,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub circle: String,
    #[serde(default)]
    pub client: String,
}

impl BranchSelection {
    /// Unselected slots are dropped before aggregation.
    pub fn is_empty(&self) -> bool {
        self.branch_name.trim().is_empty()
    }
}

/// A trip-activity submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripDraft {
    /// Defaults to the day of the save when absent.
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub data_entry_date: Option<NaiveDate>,
    #[serde(default)]
    pub vehicle_id: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub activity_date: Option<NaiveDate>,
    #[serde(default)]
    pub custodian_name: String,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub branches: Vec<BranchSelection>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_retrieval_count: i32,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_fresh_pickup_count: i32,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_return_retrieval_count: i32,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_empty_boxes_delivered_count: i32,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_opening_kms: i64,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_closing_kms: i64,
    #[serde(default)]
    pub remarks: String,
}

impl TripDraft {
    pub fn trip_id(&self) -> Option<String> {
        derive_trip_id(&self.vehicle_id, self.activity_date)
    }

    pub fn trip_kms(&self) -> i64 {
        trip_kms(self.trip_opening_kms, self.trip_closing_kms)
    }

    /// Validate the draft and freeze it into legs awaiting apportionment.
    ///
    /// Fails when no trip id can be derived, when an odometer reading is
    /// negative, when no branch is selected, or when a selected branch has no
    /// `sol_id` (it would produce a malformed transaction id).
    pub fn prepare(&self, today: NaiveDate) -> Result<PreparedTrip, CoreError> {
        let trip_id = self.trip_id().ok_or_else(|| {
            CoreError::Validation(
                "Trip ID is missing: vehicle_id and activity_date are required".into(),
            )
        })?;
        if self.trip_opening_kms < 0 || self.trip_closing_kms < 0 {
            return Err(CoreError::Validation(
                "Odometer readings cannot be negative".into(),
            ));
        }
        // trip_id() only succeeds with a date.
        let activity_date = self.activity_date.unwrap_or(today);

        let selected: Vec<&BranchSelection> =
            self.branches.iter().filter(|b| !b.is_empty()).collect();
        if selected.is_empty() {
            return Err(CoreError::Validation(
                "At least one branch must be selected".into(),
            ));
        }
        if let Some(bad) = selected.iter().find(|b| b.sol_id.trim().is_empty()) {
            return Err(CoreError::Validation(format!(
                "Branch '{}' has no sol_id",
                bad.branch_name.trim()
            )));
        }

        let trip_kms = self.trip_kms();
        let legs = selected
            .into_iter()
            .map(|b| {
                let sol_id = b.sol_id.trim().to_string();
                PlannedLeg {
                    data_entry_date: self.data_entry_date.unwrap_or(today),
                    vehicle_id: self.vehicle_id.trim().to_string(),
                    activity_date,
                    trip_id: trip_id.clone(),
                    custodian_name: self.custodian_name.clone(),
                    driver_name: self.driver_name.clone(),
                    branch_name: b.branch_name.trim().to_string(),
                    transaction_id: transaction_id(&trip_id, &sol_id),
                    sol_id,
                    cluster: b.cluster.clone(),
                    circle: b.circle.clone(),
                    client: b.client.clone(),
                    trip_retrieval_count: self.trip_retrieval_count,
                    trip_fresh_pickup_count: self.trip_fresh_pickup_count,
                    trip_return_retrieval_count: self.trip_return_retrieval_count,
                    trip_empty_boxes_delivered_count: self.trip_empty_boxes_delivered_count,
                    trip_opening_kms: self.trip_opening_kms,
                    trip_closing_kms: self.trip_closing_kms,
                    trip_kms,
                    remarks: self.remarks.clone(),
                    trip_branch_count: 0,
                    branch_kms: 0.0,
                }
            })
            .collect();

        Ok(PreparedTrip {
            trip_id,
            trip_kms,
            legs,
        })
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// One leg row ready to persist. Field order matches the export contract.
///
/// Also the shape accepted by the legacy bulk-insert endpoint, which sends
/// dates as text and numbers as form strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedLeg {
    #[serde(deserialize_with = "deserialize_date")]
    pub data_entry_date: NaiveDate,
    pub vehicle_id: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub activity_date: NaiveDate,
    pub trip_id: String,
    #[serde(default)]
    pub custodian_name: String,
    #[serde(default)]
    pub driver_name: String,
    pub branch_name: String,
    pub sol_id: String,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub circle: String,
    #[serde(default)]
    pub client: String,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_retrieval_count: i32,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_fresh_pickup_count: i32,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_return_retrieval_count: i32,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_empty_boxes_delivered_count: i32,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_opening_kms: i64,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_closing_kms: i64,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_kms: i64,
    #[serde(default)]
    pub remarks: String,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub trip_branch_count: i64,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub branch_kms: f64,
    pub transaction_id: String,
}

/// A validated draft whose legs still lack the running count and distance.
#[derive(Debug, Clone)]
pub struct PreparedTrip {
    trip_id: String,
    trip_kms: i64,
    legs: Vec<PlannedLeg>,
}

impl PreparedTrip {
    pub fn trip_id(&self) -> &str {
        &self.trip_id
    }

    pub fn new_leg_count(&self) -> i64 {
        self.legs.len() as i64
    }

    /// Apply the running total given the legs already stored for this trip.
    ///
    /// `total_legs = prior_legs + new legs`; every new leg gets
    /// `trip_branch_count = total_legs` and the same rounded share of the
    /// trip distance. Prior legs are not touched.
    pub fn apportion(self, prior_legs: i64) -> TripPlan {
        let total_legs = prior_legs.max(0) + self.new_leg_count();
        let branch_kms = apportion_kms(self.trip_kms, total_legs);

        let legs = self
            .legs
            .into_iter()
            .map(|leg| PlannedLeg {
                trip_branch_count: total_legs,
                branch_kms,
                ..leg
            })
            .collect();

        TripPlan {
            trip_id: self.trip_id,
            prior_legs: prior_legs.max(0),
            total_legs,
            branch_kms,
            legs,
        }
    }
}

/// The outcome of planning one save.
#[derive(Debug, Clone, Serialize)]
pub struct TripPlan {
    pub trip_id: String,
    pub prior_legs: i64,
    pub total_legs: i64,
    pub branch_kms: f64,
    pub legs: Vec<PlannedLeg>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn branch(name: &str, sol_id: &str) -> BranchSelection {
        BranchSelection {
            branch_name: name.into(),
            sol_id: sol_id.into(),
            cluster: "Mumbai West".into(),
            circle: "Mumbai".into(),
            client: "Acme Bank".into(),
        }
    }

    fn draft(branches: Vec<BranchSelection>) -> TripDraft {
        TripDraft {
            vehicle_id: "MH12AB1234".into(),
            activity_date: Some(date(2024, 3, 7)),
            custodian_name: "Asha".into(),
            driver_name: "Ravi".into(),
            branches,
            trip_opening_kms: 1000,
            trip_closing_kms: 1030,
            ..TripDraft::default()
        }
    }

    #[test]
    fn derives_trip_id() {
        assert_eq!(
            derive_trip_id("MH12AB1234", Some(date(2024, 3, 7))).as_deref(),
            Some("M1234/070324")
        );
        assert_eq!(
            derive_trip_id_from_text("MH12AB1234", "2024-03-07").as_deref(),
            Some("M1234/070324")
        );
        assert_eq!(
            derive_trip_id_from_text("MH12AB1234", "07-03-2024").as_deref(),
            Some("M1234/070324")
        );
    }

    #[test]
    fn trip_id_uppercases_first_char_only() {
        assert_eq!(
            derive_trip_id("mh12ab12cd", Some(date(2031, 12, 1))).as_deref(),
            Some("M12cd/011231")
        );
    }

    #[test]
    fn short_vehicle_ids_use_what_is_there() {
        assert_eq!(
            derive_trip_id("ab", Some(date(2024, 1, 2))).as_deref(),
            Some("Aab/020124")
        );
    }

    #[test]
    fn trip_id_not_derivable_without_inputs() {
        assert_eq!(derive_trip_id("", Some(date(2024, 3, 7))), None);
        assert_eq!(derive_trip_id("   ", Some(date(2024, 3, 7))), None);
        assert_eq!(derive_trip_id("MH12AB1234", None), None);
        assert_eq!(derive_trip_id_from_text("MH12AB1234", ""), None);
    }

    #[test]
    fn same_vehicle_and_day_collide() {
        let a = derive_trip_id("MH12AB1234", Some(date(2024, 3, 7)));
        let b = derive_trip_id("MH12XY1234", Some(date(2024, 3, 7)));
        assert_eq!(a, b);
    }

    #[test]
    fn trip_kms_is_never_negative() {
        assert_eq!(trip_kms(100, 80), 0);
        assert_eq!(trip_kms(100, 100), 0);
        assert_eq!(trip_kms(100, 130), 30);
    }

    #[test]
    fn trip_kms_saturates_on_extreme_readings() {
        assert_eq!(trip_kms(i64::MIN, 1), i64::MAX);
        assert_eq!(trip_kms(1, i64::MIN), 0);
        let d = TripDraft {
            trip_opening_kms: i64::MIN,
            trip_closing_kms: 1,
            ..TripDraft::default()
        };
        assert_eq!(d.trip_kms(), i64::MAX);
    }

    #[test]
    fn negative_odometer_reading_blocks_save() {
        let mut d = draft(vec![branch("Fort", "001")]);
        d.trip_opening_kms = -50;
        d.trip_closing_kms = 100;
        assert_matches!(
            d.prepare(date(2024, 3, 8)),
            Err(CoreError::Validation(msg)) if msg.contains("negative")
        );

        let mut d = draft(vec![branch("Fort", "001")]);
        d.trip_closing_kms = -1;
        assert_matches!(d.prepare(date(2024, 3, 8)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn odometer_readings_are_whole_kilometres() {
        let err = serde_json::from_value::<TripDraft>(serde_json::json!({
            "vehicle_id": "MH12AB1234",
            "trip_opening_kms": "1000.5"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("invalid number '1000.5'"));

        let d: TripDraft = serde_json::from_value(serde_json::json!({
            "trip_opening_kms": " 1000 ",
            "trip_closing_kms": 1030
        }))
        .unwrap();
        assert_eq!(d.trip_kms(), 30);
    }

    #[test]
    fn apportion_rounds_to_two_places() {
        assert_eq!(apportion_kms(30, 5), 6.0);
        assert_eq!(apportion_kms(10, 3), 3.33);
        assert_eq!(apportion_kms(20, 3), 6.67);
        assert_eq!(apportion_kms(0, 4), 0.0);
    }

    #[test]
    fn two_prior_legs_plus_three_new() {
        let prepared = draft(vec![
            branch("Fort", "001"),
            branch("Dadar", "002"),
            BranchSelection::default(),
            branch("Worli", "003"),
        ])
        .prepare(date(2024, 3, 8))
        .unwrap();

        let plan = prepared.apportion(2);

        assert_eq!(plan.total_legs, 5);
        assert_eq!(plan.branch_kms, 6.0);
        assert_eq!(plan.legs.len(), 3);
        for leg in &plan.legs {
            assert_eq!(leg.trip_branch_count, 5);
            assert_eq!(leg.branch_kms, 6.0);
            assert_eq!(leg.trip_kms, 30);
        }
        assert_eq!(plan.legs[0].transaction_id, "M1234/070324/001");
        assert_eq!(plan.legs[2].transaction_id, "M1234/070324/003");
    }

    #[test]
    fn legs_copy_trip_level_fields_and_captured_branch_values() {
        let plan = draft(vec![branch("Fort", "001")])
            .prepare(date(2024, 3, 8))
            .unwrap()
            .apportion(0);

        let leg = &plan.legs[0];
        assert_eq!(leg.trip_id, "M1234/070324");
        assert_eq!(leg.vehicle_id, "MH12AB1234");
        assert_eq!(leg.custodian_name, "Asha");
        assert_eq!(leg.cluster, "Mumbai West");
        assert_eq!(leg.client, "Acme Bank");
        assert_eq!(leg.data_entry_date, date(2024, 3, 8));
        assert_eq!(leg.activity_date, date(2024, 3, 7));
        assert_eq!(leg.branch_kms, 30.0);
    }

    #[test]
    fn resubmission_shrinks_the_share_of_new_legs() {
        let d = draft(vec![branch("Fort", "001"), branch("Dadar", "002")]);

        let first = d.prepare(date(2024, 3, 8)).unwrap().apportion(0);
        let second = d
            .prepare(date(2024, 3, 8))
            .unwrap()
            .apportion(first.legs.len() as i64);

        assert_eq!(first.total_legs, 2);
        assert_eq!(second.total_legs, 4);
        assert!(second.branch_kms < first.branch_kms);
    }

    #[test]
    fn missing_trip_id_blocks_save() {
        let mut d = draft(vec![branch("Fort", "001")]);
        d.vehicle_id.clear();
        assert_matches!(d.prepare(date(2024, 3, 8)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn no_selected_branch_blocks_save() {
        let d = draft(vec![BranchSelection::default(), BranchSelection::default()]);
        assert_matches!(
            d.prepare(date(2024, 3, 8)),
            Err(CoreError::Validation(msg)) if msg.contains("branch")
        );
    }

    #[test]
    fn selected_branch_without_sol_id_blocks_save() {
        let d = draft(vec![branch("Fort", "")]);
        assert_matches!(d.prepare(date(2024, 3, 8)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn legacy_leg_rows_accept_form_strings() {
        let leg: PlannedLeg = serde_json::from_value(serde_json::json!({
            "data_entry_date": "08/03/2024",
            "vehicle_id": "MH12AB1234",
            "activity_date": "07-03-2024",
            "trip_id": "M1234/070324",
            "branch_name": "Fort",
            "sol_id": "001",
            "trip_retrieval_count": "",
            "trip_opening_kms": "1000",
            "trip_closing_kms": "1030",
            "trip_kms": "30",
            "trip_branch_count": 2,
            "branch_kms": "15.00",
            "transaction_id": "M1234/070324/001"
        }))
        .unwrap();
        assert_eq!(leg.data_entry_date, date(2024, 3, 8));
        assert_eq!(leg.trip_retrieval_count, 0);
        assert_eq!(leg.branch_kms, 15.0);
        assert_eq!(leg.remarks, "");
    }

    #[test]
    fn draft_accepts_textual_dates() {
        let d: TripDraft = serde_json::from_value(serde_json::json!({
            "vehicle_id": "MH12AB1234",
            "activity_date": "07-03-2024",
            "data_entry_date": "",
            "branches": [{"branch_name": "Fort", "sol_id": "001"}]
        }))
        .unwrap();
        assert_eq!(d.activity_date, Some(date(2024, 3, 7)));
        assert_eq!(d.data_entry_date, None);
        assert_eq!(d.trip_id().as_deref(), Some("M1234/070324"));
    }
}
