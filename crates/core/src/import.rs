//! Import pipeline and single-record admission.
//!
//! Rows are processed strictly in source order because in-batch duplicate
//! detection depends on what was accepted before. A row that fails for any
//! reason is reported and the batch carries on; nothing here aborts a batch
//! part-way.

use serde::Serialize;

use crate::duplicate_guard::{DuplicateGuard, GuardOutcome, Rejection};
use crate::entity::EntityKind;
use crate::error::CoreError;
use crate::store::CatalogStore;
use crate::types::{DbId, Record};

/// Rows above the first data row (the header).
pub const HEADER_ROWS: usize = 1;

/// One raw row together with its 1-based position in the source sheet.
#[derive(Debug, Clone)]
pub struct SourceRow {
    pub row_number: usize,
    pub record: Record,
}

impl SourceRow {
    /// Number rows as a spreadsheet would: the first data row sits directly
    /// under the header.
    pub fn numbered(records: Vec<Record>) -> Vec<SourceRow> {
        records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| SourceRow {
                row_number: idx + 1 + HEADER_ROWS,
                record,
            })
            .collect()
    }
}

/// Why a row was not inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    MissingKey,
    DuplicateInFile,
    DuplicateInStore,
    /// Passed the guard but the store refused it (or the lookup failed).
    InsertFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    pub row_number: usize,
    pub status: RowStatus,
    pub reason: String,
    pub row: Record,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub inserted_count: usize,
    pub rejected_rows: Vec<RejectedRow>,
}

impl ImportReport {
    pub fn rejected_count(&self) -> usize {
        self.rejected_rows.len()
    }

    /// Rows that made it past the guard but failed to persist.
    pub fn failed_inserts(&self) -> impl Iterator<Item = &RejectedRow> {
        self.rejected_rows
            .iter()
            .filter(|r| r.status == RowStatus::InsertFailed)
    }
}

/// Run a batch of rows through the guard and persist the accepted ones.
///
/// Fails up-front only when `kind` cannot be imported at all.
pub async fn import_batch<S, I>(
    kind: EntityKind,
    rows: I,
    store: &S,
) -> Result<ImportReport, CoreError>
where
    S: CatalogStore + ?Sized,
    I: IntoIterator<Item = SourceRow>,
{
    if !kind.is_importable() {
        return Err(CoreError::Validation(format!(
            "{} rows cannot be imported",
            kind.label()
        )));
    }

    let mut guard = DuplicateGuard::new(kind, store);
    let mut report = ImportReport::default();

    for SourceRow { row_number, record } in rows {
        let outcome = match guard.check(&record).await {
            Ok(outcome) => outcome,
            Err(err) => {
                report.rejected_rows.push(RejectedRow {
                    row_number,
                    status: RowStatus::InsertFailed,
                    reason: err.to_string(),
                    row: record,
                });
                continue;
            }
        };

        match outcome {
            GuardOutcome::Rejected(rejection) => {
                let status = match &rejection {
                    Rejection::MissingFields { .. } => RowStatus::MissingKey,
                    Rejection::DuplicateInFile { .. } => RowStatus::DuplicateInFile,
                    Rejection::DuplicateInStore { .. } => RowStatus::DuplicateInStore,
                };
                report.rejected_rows.push(RejectedRow {
                    row_number,
                    status,
                    reason: rejection.message(),
                    row: record,
                });
            }
            GuardOutcome::Accepted(key) => match store.insert(kind, &record).await {
                Ok(_) => {
                    guard.commit(&key);
                    report.inserted_count += 1;
                }
                Err(err) => report.rejected_rows.push(RejectedRow {
                    row_number,
                    status: RowStatus::InsertFailed,
                    reason: err.to_string(),
                    row: record,
                }),
            },
        }
    }

    Ok(report)
}

/// Admit one manually entered record through the same guard as imports.
pub async fn add_reference_entity<S>(
    kind: EntityKind,
    record: &Record,
    store: &S,
) -> Result<DbId, CoreError>
where
    S: CatalogStore + ?Sized,
{
    if !kind.is_importable() {
        return Err(CoreError::Validation(format!(
            "{} records cannot be added directly",
            kind.label()
        )));
    }

    let mut guard = DuplicateGuard::new(kind, store);
    match guard.check(record).await? {
        GuardOutcome::Accepted(key) => {
            let id = store.insert(kind, record).await?;
            guard.commit(&key);
            Ok(id)
        }
        GuardOutcome::Rejected(rejection) => Err(rejection.into_error(kind)),
    }
}
