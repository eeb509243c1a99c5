//! Handlers for trip entry and trip-leg queries.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use fleetlog_core::error::CoreError;
use fleetlog_core::trip::{derive_trip_id_from_text, PlannedLeg, TripDraft};
use fleetlog_db::models::trip_leg::SavedTrip;
use fleetlog_db::repositories::TripLegRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TripIdQuery {
    #[serde(default)]
    pub vehicle_id: String,
    #[serde(default)]
    pub activity_date: String,
}

#[derive(Debug, Serialize)]
pub struct TripIdPreview {
    pub trip_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LegCountQuery {
    pub trip_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LegCount {
    pub trip_id: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct BulkInsertResult {
    pub inserted_count: usize,
}

/// GET /api/v1/trips/trip-id
pub async fn preview_trip_id(
    _user: AuthUser,
    Query(params): Query<TripIdQuery>,
) -> AppResult<Json<DataResponse<TripIdPreview>>> {
    let trip_id = derive_trip_id_from_text(&params.vehicle_id, &params.activity_date)
        .ok_or_else(|| {
            CoreError::Validation(
                "Trip ID is missing: vehicle_id and a valid activity_date are required".into(),
            )
        })?;
    Ok(Json(DataResponse {
        data: TripIdPreview { trip_id },
    }))
}

/// POST /api/v1/trips
///
/// Append one leg per selected branch. Saving the same trip again appends
/// more legs and recomputes the per-leg distance over the larger total.
pub async fn save_trip(
    State(state): State<AppState>,
    user: AuthUser,
    Json(draft): Json<TripDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<SavedTrip>>)> {
    let today = chrono::Local::now().date_naive();
    let prepared = draft.prepare(today)?;

    let saved = TripLegRepo::append_trip(&state.pool, prepared).await?;
    tracing::info!(
        trip_id = %saved.trip_id,
        new_legs = saved.legs.len(),
        total_legs = saved.total_legs,
        branch_kms = saved.branch_kms,
        user_id = user.user_id,
        "Trip saved"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: saved })))
}

/// GET /api/v1/trip-legs/count?trip_id=
pub async fn count_legs(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<LegCountQuery>,
) -> AppResult<Json<DataResponse<LegCount>>> {
    let trip_id = params
        .trip_id
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("trip_id is required".into()))?;

    let count = TripLegRepo::count_by_trip(&state.pool, &trip_id).await?;
    Ok(Json(DataResponse {
        data: LegCount { trip_id, count },
    }))
}

/// POST /api/v1/trip-legs/bulk
///
/// Insert legs that were fully computed by an older client. Rows are stored
/// as given; nothing is recounted.
pub async fn bulk_insert_legs(
    State(state): State<AppState>,
    user: AuthUser,
    Json(legs): Json<Vec<PlannedLeg>>,
) -> AppResult<(StatusCode, Json<DataResponse<BulkInsertResult>>)> {
    if let Some(bad) = legs.iter().find(|l| l.trip_kms < 0) {
        return Err(AppError::BadRequest(format!(
            "trip_kms must not be negative (transaction {})",
            bad.transaction_id
        )));
    }

    let inserted = TripLegRepo::insert_batch(&state.pool, &legs).await?;
    tracing::info!(
        inserted_count = inserted.len(),
        user_id = user.user_id,
        "Bulk trip legs inserted"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: BulkInsertResult {
                inserted_count: inserted.len(),
            },
        }),
    ))
}
