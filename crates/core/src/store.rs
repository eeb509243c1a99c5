//! Persistence seam for the duplicate guard and the import pipeline.

use async_trait::async_trait;

use crate::duplicate_guard::NaturalKey;
use crate::entity::EntityKind;
use crate::error::CoreError;
use crate::types::{DbId, Record};

/// Keyed access to the reference catalog.
///
/// The PostgreSQL implementation lives in `fleetlog-db`; tests use the
/// in-memory store below.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Whether a persisted record of `kind` already carries `key`.
    async fn key_exists(&self, kind: EntityKind, key: &NaturalKey) -> Result<bool, CoreError>;

    /// Persist one accepted record, returning its new id.
    async fn insert(&self, kind: EntityKind, record: &Record) -> Result<DbId, CoreError>;
}
