//! Repository for the single-column catalog tables.

use fleetlog_core::entity::EntityKind;
use sqlx::PgPool;

use crate::models::named::{CreateNamedEntity, NamedEntity};

const COLUMNS: &str = "id, name, created_at";

/// CRUD for clients, vehicles, custodians and drivers.
///
/// The table is picked from `kind`; callers must pass one of the name-keyed
/// kinds (see [`NamedEntityRepo::handles`]).
pub struct NamedEntityRepo;

impl NamedEntityRepo {
    pub fn handles(kind: EntityKind) -> bool {
        matches!(
            kind,
            EntityKind::Client | EntityKind::Vehicle | EntityKind::Custodian | EntityKind::Driver
        )
    }

    pub async fn create(
        pool: &PgPool,
        kind: EntityKind,
        input: &CreateNamedEntity,
    ) -> Result<NamedEntity, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (name) VALUES ($1) RETURNING {COLUMNS}",
            kind.table()
        );
        sqlx::query_as::<_, NamedEntity>(&query)
            .bind(input.name.trim())
            .fetch_one(pool)
            .await
    }

    /// List all rows sorted by name, as shown in the trip form dropdowns.
    pub async fn list(pool: &PgPool, kind: EntityKind) -> Result<Vec<NamedEntity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {} ORDER BY name", kind.table());
        sqlx::query_as::<_, NamedEntity>(&query)
            .fetch_all(pool)
            .await
    }
}
