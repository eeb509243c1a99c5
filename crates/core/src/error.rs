use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A record with the same natural key already exists.
    ///
    /// `fields` holds the offending field/value pairs in key order.
    #[error("Duplicate entry for {entity}")]
    Duplicate {
        entity: &'static str,
        fields: BTreeMap<String, String>,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
