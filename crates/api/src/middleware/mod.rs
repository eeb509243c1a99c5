//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireManager`] -- Requires the `admin` or `manager` role.

pub mod auth;
pub mod rbac;
