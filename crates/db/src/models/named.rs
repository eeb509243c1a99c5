//! Flat name-keyed lists: clients, vehicles, custodians and drivers.

use fleetlog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from any of the single-column catalog tables.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NamedEntity {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateNamedEntity {
    pub name: String,
}
