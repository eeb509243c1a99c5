//! Duplicate guard: decides whether a candidate record may be persisted.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. **Missing key** -- a key field (or the required parent reference) is
//!    absent, null, or blank.
//! 2. **Duplicate within file** -- the key matches one stored earlier in
//!    the same batch. The earlier occurrence is kept.
//! 3. **Duplicate entry** -- the key matches a persisted record.
//!
//! Manual entry and bulk import use the same guard, so a record is judged
//! identically on both paths.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::entity::EntityKind;
use crate::error::CoreError;
use crate::store::CatalogStore;
use crate::types::{value_as_text, DbId, Record};

/// Joins composite key components. Not expected to occur in data.
pub const KEY_SEPARATOR: &str = "|";

// ---------------------------------------------------------------------------
// Natural key
// ---------------------------------------------------------------------------

/// The natural key of one record: ordered `(field, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalKey {
    parts: Vec<(&'static str, String)>,
}

impl NaturalKey {
    /// Build the key for `record` according to `kind`'s key specification.
    ///
    /// Values are trimmed, and a parent reference inside the key is reduced to
    /// its integer form (`"03"` and `3` name the same parent). Fails with
    /// [`Rejection::MissingFields`] naming every guarded field that is absent
    /// or blank, including the required parent reference.
    pub fn extract(kind: EntityKind, record: &Record) -> Result<Self, Rejection> {
        let missing: Vec<String> = kind
            .guarded_fields()
            .into_iter()
            .filter(|field| field_text(record, field).is_none())
            .map(String::from)
            .collect();

        if !missing.is_empty() {
            return Err(Rejection::MissingFields { fields: missing });
        }

        let parts = kind
            .unique_key()
            .iter()
            .map(|field| {
                let text = field_text(record, field).unwrap_or_default();
                let text = if kind.parent_field() == Some(*field) {
                    canonical_id(text)
                } else {
                    text
                };
                (*field, text)
            })
            .collect();

        Ok(Self { parts })
    }

    /// Single-field keys are the bare value; composite keys are joined with
    /// [`KEY_SEPARATOR`] in key order.
    pub fn joined(&self) -> String {
        self.parts
            .iter()
            .map(|(_, v)| v.as_str())
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR)
    }

    pub fn parts(&self) -> &[(&'static str, String)] {
        &self.parts
    }

    /// Field/value pairs for duplicate reporting.
    pub fn to_fields(&self) -> BTreeMap<String, String> {
        self.parts
            .iter()
            .map(|(f, v)| ((*f).to_string(), v.clone()))
            .collect()
    }
}

/// Trimmed text of a field, or `None` when absent, null, or blank.
fn field_text(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let text = value_as_text(value).trim().to_string();
            (!text.is_empty()).then_some(text)
        }
    }
}

/// Unparseable ids are left as written; the insert reports them.
fn canonical_id(text: String) -> String {
    text.parse::<DbId>().map(|id| id.to_string()).unwrap_or(text)
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why a record was turned away. Never fatal: the caller reports it and
/// moves on to the next row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    MissingFields { fields: Vec<String> },
    DuplicateInFile { key: String },
    DuplicateInStore { fields: BTreeMap<String, String> },
}

impl Rejection {
    /// Stable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFields { .. } => "missing_key",
            Self::DuplicateInFile { .. } => "duplicate_in_file",
            Self::DuplicateInStore { .. } => "duplicate_in_store",
        }
    }

    /// Human-readable reason.
    pub fn message(&self) -> String {
        match self {
            Self::MissingFields { fields } => {
                format!("missing required field(s): {}", fields.join(", "))
            }
            Self::DuplicateInFile { key } => format!("duplicate within file: {key}"),
            Self::DuplicateInStore { fields } => {
                let pairs: Vec<String> = fields
                    .iter()
                    .map(|(f, v)| format!("{f}: \"{v}\""))
                    .collect();
                format!("duplicate entry: {}", pairs.join(", "))
            }
        }
    }

    /// Map to the error taxonomy used on the single-record path.
    pub fn into_error(self, kind: EntityKind) -> CoreError {
        match self {
            Self::DuplicateInStore { fields } => CoreError::Duplicate {
                entity: kind.label(),
                fields,
            },
            other => CoreError::Validation(other.message()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Accepted(NaturalKey),
    Rejected(Rejection),
}

// ---------------------------------------------------------------------------
// Guard
// ---------------------------------------------------------------------------

/// Stateful guard for one batch of one entity kind.
///
/// Keys are remembered once [`commit`](Self::commit) reports them stored, so
/// later rows of the same batch are checked against them. A row whose insert
/// failed leaves no trace. Rows must be fed in source order.
pub struct DuplicateGuard<'a, S: CatalogStore + ?Sized> {
    kind: EntityKind,
    store: &'a S,
    accepted: HashSet<String>,
}

impl<'a, S: CatalogStore + ?Sized> DuplicateGuard<'a, S> {
    pub fn new(kind: EntityKind, store: &'a S) -> Self {
        Self {
            kind,
            store,
            accepted: HashSet::new(),
        }
    }

    /// Judge one record.
    ///
    /// `Err` only when the store lookup itself fails; every rejection is an
    /// `Ok(GuardOutcome::Rejected(..))`.
    pub async fn check(&mut self, record: &Record) -> Result<GuardOutcome, CoreError> {
        let key = match NaturalKey::extract(self.kind, record) {
            Ok(key) => key,
            Err(rejection) => return Ok(GuardOutcome::Rejected(rejection)),
        };

        let joined = key.joined();
        if self.accepted.contains(&joined) {
            return Ok(GuardOutcome::Rejected(Rejection::DuplicateInFile {
                key: joined,
            }));
        }

        if self.store.key_exists(self.kind, &key).await? {
            return Ok(GuardOutcome::Rejected(Rejection::DuplicateInStore {
                fields: key.to_fields(),
            }));
        }

        Ok(GuardOutcome::Accepted(key))
    }

    /// Record that the row carrying `key` was stored.
    pub fn commit(&mut self, key: &NaturalKey) {
        self.accepted.insert(key.joined());
    }
}
