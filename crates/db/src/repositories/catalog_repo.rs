//! Kind-generic queries shared by the catalog, table and export views.
//!
//! Table and column names come from [`EntityKind`], never from request
//! input, so they are safe to interpolate. Values are always bound.

use fleetlog_core::duplicate_guard::NaturalKey;
use fleetlog_core::entity::EntityKind;
use fleetlog_core::types::{DbId, Record};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};

pub struct CatalogRepo;

impl CatalogRepo {
    /// Whether a row with the given natural key already exists.
    ///
    /// Each key column is compared as trimmed text so numeric parent ids and
    /// textual form values match the same way.
    pub async fn key_exists(
        pool: &PgPool,
        kind: EntityKind,
        key: &NaturalKey,
    ) -> Result<bool, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT EXISTS (SELECT 1 FROM {} WHERE ", kind.table()));
        for (i, (field, value)) in key.parts().iter().enumerate() {
            if i > 0 {
                qb.push(" AND ");
            }
            qb.push(format!("btrim({field}::text) = "));
            qb.push_bind(value.clone());
        }
        qb.push(")");

        qb.build_query_scalar::<bool>().fetch_one(pool).await
    }

    /// Delete the rows with the given ids. Returns the number removed.
    pub async fn delete_many(
        pool: &PgPool,
        kind: EntityKind,
        ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let query = format!("DELETE FROM {} WHERE id = ANY($1)", kind.table());
        let result = sqlx::query(&query).bind(ids).execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Every row of the kind's table as a JSON object, oldest first.
    ///
    /// Password hashes are stripped before the rows leave the database.
    pub async fn list_records(pool: &PgPool, kind: EntityKind) -> Result<Vec<Record>, sqlx::Error> {
        let query = format!(
            "SELECT to_jsonb(t) - 'password_hash' FROM {} t ORDER BY t.id",
            kind.table()
        );
        let rows = sqlx::query_scalar::<_, Value>(&query).fetch_all(pool).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }
}
