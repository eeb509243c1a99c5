//! Handlers for CSV and ZIP downloads.

use std::io::{Cursor, Write};

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use fleetlog_core::dates::format_date_columns;
use fleetlog_core::entity::EntityKind;
use fleetlog_core::sheet::build_csv;
use fleetlog_db::repositories::CatalogRepo;
use fleetlog_db::DbPool;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Render every row of `kind` as CSV in the kind's export column order.
async fn export_csv(pool: &DbPool, kind: EntityKind) -> AppResult<Vec<u8>> {
    let mut rows = CatalogRepo::list_records(pool, kind).await?;
    for row in &mut rows {
        format_date_columns(row, kind.date_columns());
    }
    Ok(build_csv(kind.export_columns(), &rows)?)
}

fn attachment(content_type: &'static str, filename: String, body: Vec<u8>) -> Response {
    (
        [
            (CONTENT_TYPE, content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// GET /api/v1/export/{kind}
pub async fn export_kind(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(kind): Path<String>,
) -> AppResult<Response> {
    let kind: EntityKind = kind.parse()?;
    let body = export_csv(&state.pool, kind).await?;
    Ok(attachment(
        CSV_CONTENT_TYPE,
        format!("{}.csv", kind.table()),
        body,
    ))
}

/// GET /api/v1/export
///
/// One archive holding a CSV per record kind.
pub async fn export_all(State(state): State<AppState>, _user: AuthUser) -> AppResult<Response> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for kind in EntityKind::ALL {
        let csv = export_csv(&state.pool, kind).await?;
        zip.start_file(format!("{}.csv", kind.table()), options)
            .map_err(|e| AppError::InternalError(format!("Failed to write archive: {e}")))?;
        zip.write_all(&csv)
            .map_err(|e| AppError::InternalError(format!("Failed to write archive: {e}")))?;
    }

    let archive = zip
        .finish()
        .map_err(|e| AppError::InternalError(format!("Failed to finish archive: {e}")))?
        .into_inner();

    let stamp = chrono::Local::now().format("%d-%m-%Y");
    Ok(attachment(
        ZIP_CONTENT_TYPE,
        format!("fleetlog-export-{stamp}.zip"),
        archive,
    ))
}
