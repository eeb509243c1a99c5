use fleetlog_core::types::{deserialize_lenient_id, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `circles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Circle {
    pub id: DbId,
    pub name: String,
    pub client_id: DbId,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCircle {
    pub name: String,
    #[serde(deserialize_with = "deserialize_lenient_id")]
    pub client_id: DbId,
}
