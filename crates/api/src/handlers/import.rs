//! Handlers for spreadsheet imports.
//!
//! Files arrive either as a CSV upload or as rows the browser already parsed
//! from a workbook. Both paths run the same pipeline and return the same
//! report.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use fleetlog_core::entity::EntityKind;
use fleetlog_core::import::{import_batch, ImportReport, RejectedRow, SourceRow};
use fleetlog_core::sheet::parse_csv_rows;
use fleetlog_core::types::Record;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::catalog::ensure_may_write;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub kind: EntityKind,
    pub inserted_count: usize,
    pub rejected_count: usize,
    pub rejected_rows: Vec<RejectedRow>,
}

impl ImportSummary {
    fn new(kind: EntityKind, report: ImportReport) -> Self {
        Self {
            kind,
            inserted_count: report.inserted_count,
            rejected_count: report.rejected_count(),
            rejected_rows: report.rejected_rows,
        }
    }
}

/// POST /api/v1/import/{kind}
pub async fn import_file(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportSummary>>> {
    let kind: EntityKind = kind.parse()?;
    ensure_may_write(kind, &user)?;

    let mut contents = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
        contents = Some(bytes);
        break;
    }

    let contents = contents.ok_or_else(|| {
        AppError::BadRequest(format!("Missing multipart field '{FILE_FIELD}'"))
    })?;
    let rows = parse_csv_rows(&contents)?;

    run_import(&state, kind, rows, &user).await
}

/// POST /api/v1/import/{kind}/rows
pub async fn import_rows(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<String>,
    Json(rows): Json<Vec<Record>>,
) -> AppResult<Json<DataResponse<ImportSummary>>> {
    let kind: EntityKind = kind.parse()?;
    ensure_may_write(kind, &user)?;

    run_import(&state, kind, SourceRow::numbered(rows), &user).await
}

async fn run_import(
    state: &AppState,
    kind: EntityKind,
    rows: Vec<SourceRow>,
    user: &AuthUser,
) -> AppResult<Json<DataResponse<ImportSummary>>> {
    let total = rows.len();
    let report = import_batch(kind, rows, &state.catalog()).await?;

    for failed in report.failed_inserts() {
        tracing::warn!(
            kind = %kind,
            row = failed.row_number,
            reason = %failed.reason,
            "Import row failed to persist"
        );
    }
    tracing::info!(
        kind = %kind,
        total,
        inserted = report.inserted_count,
        rejected = report.rejected_count(),
        user_id = user.user_id,
        "Import finished"
    );

    Ok(Json(DataResponse {
        data: ImportSummary::new(kind, report),
    }))
}
