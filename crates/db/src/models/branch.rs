//! Branch rows and the denormalized view used to fill the trip form.

use fleetlog_core::types::{deserialize_lenient_id, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `branches` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Branch {
    pub id: DbId,
    pub sol_id: String,
    pub branch_name: String,
    pub cluster_id: DbId,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBranch {
    pub sol_id: String,
    pub branch_name: String,
    #[serde(deserialize_with = "deserialize_lenient_id")]
    pub cluster_id: DbId,
}

/// A branch joined up through its cluster and circle to its client.
///
/// Picking one of these on the trip form fills every denormalized field of
/// the resulting leg.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BranchDetail {
    pub id: DbId,
    pub sol_id: String,
    pub branch_name: String,
    pub cluster: String,
    pub circle: String,
    pub client: String,
}
