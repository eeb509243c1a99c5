use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A loosely-typed row: field name to JSON value.
///
/// Manual-entry forms, spreadsheet rows and CSV rows all arrive in this shape
/// before they are checked and converted to typed create DTOs.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Deserialize an id that may arrive as a JSON number or as a numeric string.
///
/// Spreadsheet and CSV rows carry every cell as text, so parent references
/// such as `client_id` show up as `"3"` rather than `3`.
pub fn deserialize_lenient_id<'de, D>(deserializer: D) -> Result<DbId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Int(DbId),
        Text(String),
    }

    match IdRepr::deserialize(deserializer)? {
        IdRepr::Int(id) => Ok(id),
        IdRepr::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid id '{s}'"))),
    }
}

/// Deserialize a number that may arrive as a JSON number, a numeric string,
/// an empty string, or null. Empty and null become `T::default()`.
///
/// Form inputs and spreadsheet cells deliver counters and odometer readings
/// as text.
pub fn deserialize_lenient_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr + Default,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumRepr<T> {
        Num(T),
        Text(String),
    }

    match Option::<NumRepr<T>>::deserialize(deserializer)? {
        None => Ok(T::default()),
        Some(NumRepr::Num(n)) => Ok(n),
        Some(NumRepr::Text(s)) if s.trim().is_empty() => Ok(T::default()),
        Some(NumRepr::Text(s)) => s
            .trim()
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid number '{s}': {e}"))),
    }
}

/// Render a JSON cell as plain text (no quotes around strings).
///
/// `Null` renders as the empty string.
pub fn value_as_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
