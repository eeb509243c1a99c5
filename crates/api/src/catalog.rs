//! Catalog store used by the HTTP layer.
//!
//! Wraps [`PgCatalog`] so user records submitted through the entity and
//! import endpoints have their plaintext `password` replaced by an Argon2id
//! hash before they reach the database.

use async_trait::async_trait;
use fleetlog_core::duplicate_guard::NaturalKey;
use fleetlog_core::entity::EntityKind;
use fleetlog_core::error::CoreError;
use fleetlog_core::roles::{is_valid_role, ROLE_USER};
use fleetlog_core::store::CatalogStore;
use fleetlog_core::types::{value_as_text, DbId, Record};
use fleetlog_db::PgCatalog;
use serde_json::Value;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};

pub struct AccountAwareCatalog {
    inner: PgCatalog,
}

impl AccountAwareCatalog {
    pub fn new(inner: PgCatalog) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CatalogStore for AccountAwareCatalog {
    async fn key_exists(&self, kind: EntityKind, key: &NaturalKey) -> Result<bool, CoreError> {
        self.inner.key_exists(kind, key).await
    }

    async fn insert(&self, kind: EntityKind, record: &Record) -> Result<DbId, CoreError> {
        if kind != EntityKind::User {
            return self.inner.insert(kind, record).await;
        }
        let account = prepare_account(record)?;
        self.inner.insert(kind, &account).await
    }
}

/// Validate a submitted user record and swap its password for a hash.
///
/// A client-supplied `password_hash` is never trusted. A missing role
/// defaults to `user`.
fn prepare_account(record: &Record) -> Result<Record, CoreError> {
    let mut account = record.clone();
    account.remove("password_hash");

    let password = account
        .remove("password")
        .map(|v| value_as_text(&v))
        .unwrap_or_default();
    validate_password_strength(&password, MIN_PASSWORD_LENGTH).map_err(CoreError::Validation)?;

    let role = account
        .get("role")
        .map(value_as_text)
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| ROLE_USER.to_string());
    if !is_valid_role(&role) {
        return Err(CoreError::Validation(format!("Unknown role '{role}'")));
    }

    let hash = hash_password(&password)
        .map_err(|e| CoreError::Internal(format!("Password hashing failed: {e}")))?;

    account.insert("role".into(), Value::String(role.trim().to_ascii_lowercase()));
    account.insert("password_hash".into(), Value::String(hash));
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn password_is_replaced_by_hash() {
        let account = prepare_account(&record(json!({
            "name": "Asha",
            "email": "asha@example.com",
            "password": "depot-gate-42",
            "password_hash": "attacker-chosen",
            "role": "Manager",
        })))
        .unwrap();

        assert!(!account.contains_key("password"));
        let hash = account["password_hash"].as_str().unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(account["role"], "manager");
    }

    #[test]
    fn role_defaults_to_user() {
        let account = prepare_account(&record(json!({
            "email": "a@example.com",
            "password": "long-enough",
        })))
        .unwrap();
        assert_eq!(account["role"], "user");
    }

    #[test]
    fn short_password_and_unknown_role_are_rejected() {
        let short = prepare_account(&record(json!({"email": "a@x", "password": "abc"})));
        assert_matches!(short, Err(CoreError::Validation(_)));

        let bad_role = prepare_account(&record(json!({
            "email": "a@x",
            "password": "long-enough",
            "role": "owner",
        })));
        assert_matches!(bad_role, Err(CoreError::Validation(msg)) if msg.contains("owner"));
    }
}
