use fleetlog_core::types::{deserialize_lenient_id, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `clusters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Cluster {
    pub id: DbId,
    pub name: String,
    pub circle_id: DbId,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCluster {
    pub name: String,
    #[serde(deserialize_with = "deserialize_lenient_id")]
    pub circle_id: DbId,
}
