pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                  login (public)
///
/// /dropdowns                   trip form select data
/// /tables/{kind}               list rows of a kind
/// /entities/{kind}             add one catalog record (POST)
/// /import/{kind}               import a CSV upload (multipart)
/// /import/{kind}/rows          import pre-parsed rows (JSON)
/// /delete                      bulk delete by id (manager or admin)
///
/// /trips                       save a trip (POST)
/// /trips/trip-id               derive a trip id
/// /trip-legs/count             legs stored for a trip
/// /trip-legs/bulk              legacy leg insert (POST)
///
/// /export                      ZIP of every kind
/// /export/{kind}               CSV of one kind
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/dropdowns", get(handlers::catalog::dropdowns))
        .route("/tables/{kind}", get(handlers::catalog::list_table))
        .route("/entities/{kind}", post(handlers::catalog::create_entity))
        .route("/import/{kind}", post(handlers::import::import_file))
        .route("/import/{kind}/rows", post(handlers::import::import_rows))
        .route("/delete", post(handlers::catalog::delete_entities))
        .route("/trips", post(handlers::trip::save_trip))
        .route("/trips/trip-id", get(handlers::trip::preview_trip_id))
        .route("/trip-legs/count", get(handlers::trip::count_legs))
        .route("/trip-legs/bulk", post(handlers::trip::bulk_insert_legs))
        .route("/export", get(handlers::export::export_all))
        .route("/export/{kind}", get(handlers::export::export_kind))
}
