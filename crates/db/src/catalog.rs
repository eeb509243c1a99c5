//! Postgres-backed [`CatalogStore`].

use async_trait::async_trait;
use fleetlog_core::duplicate_guard::NaturalKey;
use fleetlog_core::entity::EntityKind;
use fleetlog_core::error::CoreError;
use fleetlog_core::store::CatalogStore;
use fleetlog_core::types::{value_as_text, DbId, Record};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::branch::CreateBranch;
use crate::models::circle::CreateCircle;
use crate::models::cluster::CreateCluster;
use crate::models::named::CreateNamedEntity;
use crate::models::user::CreateUser;
use crate::repositories::{
    BranchRepo, CatalogRepo, CircleRepo, ClusterRepo, NamedEntityRepo, UserRepo,
};
use crate::DbPool;

/// Catalog store over the reference tables.
///
/// User records must already carry a `password_hash`; hashing happens in the
/// HTTP layer.
#[derive(Clone)]
pub struct PgCatalog {
    pool: DbPool,
}

impl PgCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn key_exists(&self, kind: EntityKind, key: &NaturalKey) -> Result<bool, CoreError> {
        CatalogRepo::key_exists(&self.pool, kind, key)
            .await
            .map_err(|e| map_db_error(kind, e, None))
    }

    async fn insert(&self, kind: EntityKind, record: &Record) -> Result<DbId, CoreError> {
        let pool = &self.pool;
        let result = match kind {
            k if NamedEntityRepo::handles(k) => {
                let input: CreateNamedEntity = parse_record(kind, record)?;
                NamedEntityRepo::create(pool, k, &input).await.map(|r| r.id)
            }
            EntityKind::Circle => {
                let input: CreateCircle = parse_record(kind, record)?;
                CircleRepo::create(pool, &input).await.map(|r| r.id)
            }
            EntityKind::Cluster => {
                let input: CreateCluster = parse_record(kind, record)?;
                ClusterRepo::create(pool, &input).await.map(|r| r.id)
            }
            EntityKind::Branch => {
                let input: CreateBranch = parse_record(kind, record)?;
                BranchRepo::create(pool, &input).await.map(|r| r.id)
            }
            EntityKind::User => {
                let input: CreateUser = parse_record(kind, record)?;
                UserRepo::create(pool, &input).await.map(|r| r.id)
            }
            _ => {
                return Err(CoreError::Validation(format!(
                    "{} records cannot be added to the catalog",
                    kind.label()
                )))
            }
        };
        result.map_err(|e| map_db_error(kind, e, Some(record)))
    }
}

/// Deserialize a loose record into a typed insert DTO.
///
/// Spreadsheet cells arrive as strings or numbers depending on the source,
/// so scalars are normalized to text first and nulls are dropped.
fn parse_record<T: DeserializeOwned>(kind: EntityKind, record: &Record) -> Result<T, CoreError> {
    let normalized: Record = record
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v {
            Value::Number(_) | Value::Bool(_) => (k.clone(), Value::String(value_as_text(v))),
            _ => (k.clone(), v.clone()),
        })
        .collect();
    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| CoreError::Validation(format!("invalid {} record: {e}", kind.label())))
}

/// Translate a sqlx error into the domain error the caller should see.
///
/// A unique violation that slipped past the guard (a concurrent insert)
/// still surfaces as a duplicate naming the key fields. Foreign key
/// violations become conflicts.
pub fn map_db_error(kind: EntityKind, err: sqlx::Error, record: Option<&Record>) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                let fields = record
                    .and_then(|r| NaturalKey::extract(kind, r).ok())
                    .map(|key| key.to_fields())
                    .unwrap_or_default();
                return CoreError::Duplicate {
                    entity: kind.label(),
                    fields,
                };
            }
            Some("23503") => {
                return CoreError::Conflict(match record {
                    Some(_) => format!("{} references a parent that does not exist", kind.label()),
                    None => format!("{} is still referenced by other records", kind.label()),
                });
            }
            Some("23514") | Some("23502") => {
                return CoreError::Validation(db_err.message().to_string());
            }
            _ => {}
        }
    }
    tracing::error!(kind = kind.tag(), error = %err, "Catalog query failed");
    CoreError::Internal(format!("database error: {err}"))
}
