//! Calendar-date parsing and formatting.
//!
//! One rule applies everywhere: textual dates are calendar dates with no
//! time and no timezone. They are parsed into [`NaiveDate`] and stored as SQL
//! `DATE`, so no offset can ever move a date onto the neighbouring day.
//!
//! Accepted input forms:
//! - `dd-mm-yyyy` (the canonical display form)
//! - `dd/mm/yyyy` (what an `en-GB` locale date string looks like)
//! - `yyyy-mm-dd` (HTML date inputs and ISO)

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::Record;

pub const DISPLAY_FORMAT: &str = "%d-%m-%Y";

const INPUT_FORMATS: &[&str] = &[DISPLAY_FORMAT, "%d/%m/%Y", "%Y-%m-%d"];

/// Parse a textual date in any accepted form.
pub fn parse_date(input: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = input.trim();
    // ISO datetimes ("2024-03-07T00:00:00.000Z") keep only the date part.
    let candidate = trimmed.split('T').next().unwrap_or(trimmed);

    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid date '{input}'. Expected dd-mm-yyyy or yyyy-mm-dd"
            ))
        })
}

/// Format a date as `dd-mm-yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Rewrite the named date columns of a record in display form.
///
/// Cells that are empty or do not parse are left untouched.
pub fn format_date_columns(record: &mut Record, columns: &[&str]) {
    for column in columns {
        let Some(Value::String(text)) = record.get(*column) else {
            continue;
        };
        if let Ok(date) = parse_date(text) {
            record.insert((*column).to_string(), Value::String(format_date(date)));
        }
    }
}

/// Serde adapter for required date fields given in any accepted form.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_date(&text).map_err(serde::de::Error::custom)
}

/// Serde adapter for optional date fields; empty strings become `None`.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => parse_date(&text).map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_all_accepted_forms() {
        assert_eq!(parse_date("07-03-2024").unwrap(), d(2024, 3, 7));
        assert_eq!(parse_date("07/03/2024").unwrap(), d(2024, 3, 7));
        assert_eq!(parse_date("2024-03-07").unwrap(), d(2024, 3, 7));
        assert_eq!(parse_date("2024-03-07T00:00:00.000Z").unwrap(), d(2024, 3, 7));
    }

    #[test]
    fn midnight_dates_do_not_shift() {
        // The first of the month must stay the first, whatever the host zone.
        assert_eq!(parse_date("01-01-2025").unwrap(), d(2025, 1, 1));
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert!(parse_date("").is_err());
        assert!(parse_date("31-02-2024").is_err());
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn formats_display_form() {
        assert_eq!(format_date(d(2024, 3, 7)), "07-03-2024");
    }

    #[test]
    fn rewrites_only_named_columns() {
        let mut record: Record = json!({
            "activity_date": "2024-03-07",
            "remarks": "2024-03-07",
            "data_entry_date": null,
        })
        .as_object()
        .unwrap()
        .clone();

        format_date_columns(&mut record, &["activity_date", "data_entry_date"]);

        assert_eq!(record["activity_date"], "07-03-2024");
        assert_eq!(record["remarks"], "2024-03-07");
        assert!(record["data_entry_date"].is_null());
    }
}
