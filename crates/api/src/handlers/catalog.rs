//! Handlers for reference-catalog entry, listing and deletion.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fleetlog_core::dates::format_date_columns;
use fleetlog_core::entity::EntityKind;
use fleetlog_core::error::CoreError;
use fleetlog_core::import::add_reference_entity;
use fleetlog_core::types::{DbId, Record};
use fleetlog_db::models::branch::BranchDetail;
use fleetlog_db::repositories::{BranchRepo, CatalogRepo, NamedEntityRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Everything the trip form needs to fill its selects.
#[derive(Debug, Serialize)]
pub struct DropdownData {
    pub vehicles: Vec<String>,
    pub custodians: Vec<String>,
    pub drivers: Vec<String>,
    pub branches: Vec<BranchDetail>,
}

#[derive(Debug, Serialize)]
pub struct CreatedEntity {
    pub kind: EntityKind,
    pub id: DbId,
}

/// Request body for `POST /delete`.
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteRequest {
    pub table: String,
    #[validate(length(min = 1, message = "at least one id is required"))]
    pub ids: Vec<DbId>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub kind: EntityKind,
    pub deleted_count: u64,
}

/// Creating accounts is reserved for privileged roles.
pub(crate) fn ensure_may_write(kind: EntityKind, user: &AuthUser) -> AppResult<()> {
    if kind == EntityKind::User && !user.is_privileged() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Manager or Admin role required to create users".into(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/dropdowns
pub async fn dropdowns(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<DropdownData>>> {
    let names = |rows: Vec<fleetlog_db::models::named::NamedEntity>| {
        rows.into_iter().map(|r| r.name).collect::<Vec<_>>()
    };

    let vehicles = NamedEntityRepo::list(&state.pool, EntityKind::Vehicle).await?;
    let custodians = NamedEntityRepo::list(&state.pool, EntityKind::Custodian).await?;
    let drivers = NamedEntityRepo::list(&state.pool, EntityKind::Driver).await?;
    let branches = BranchRepo::list_details(&state.pool).await?;

    Ok(Json(DataResponse {
        data: DropdownData {
            vehicles: names(vehicles),
            custodians: names(custodians),
            drivers: names(drivers),
            branches,
        },
    }))
}

/// GET /api/v1/tables/{kind}
pub async fn list_table(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(kind): Path<String>,
) -> AppResult<Json<DataResponse<Vec<Record>>>> {
    let kind: EntityKind = kind.parse()?;
    let mut rows = CatalogRepo::list_records(&state.pool, kind).await?;
    for row in &mut rows {
        format_date_columns(row, kind.date_columns());
    }
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/entities/{kind}
///
/// Manual single-record entry through the duplicate guard.
pub async fn create_entity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<String>,
    Json(record): Json<Record>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedEntity>>)> {
    let kind: EntityKind = kind.parse()?;
    ensure_may_write(kind, &user)?;

    let id = add_reference_entity(kind, &record, &state.catalog()).await?;
    tracing::info!(kind = %kind, id, user_id = user.user_id, "Catalog record added");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedEntity { kind, id },
        }),
    ))
}

/// POST /api/v1/delete
///
/// Remove catalog records by id. Records still referenced by children are
/// refused with 409.
pub async fn delete_entities(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Json(input): Json<DeleteRequest>,
) -> AppResult<Json<DataResponse<DeleteResult>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let kind: EntityKind = input.table.parse()?;
    if !kind.is_deletable() {
        return Err(AppError::BadRequest(format!(
            "{} records cannot be deleted",
            kind.label()
        )));
    }

    let deleted_count = CatalogRepo::delete_many(&state.pool, kind, &input.ids).await?;
    tracing::info!(
        kind = %kind,
        requested = input.ids.len(),
        deleted_count,
        user_id = user.user_id,
        "Catalog records deleted"
    );

    Ok(Json(DataResponse {
        data: DeleteResult {
            kind,
            deleted_count,
        },
    }))
}
