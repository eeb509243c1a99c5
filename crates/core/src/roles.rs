//! Well-known role name constants.
//!
//! These must match the `ck_users_role` check constraint in the users migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_USER: &str = "user";

pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MANAGER, ROLE_USER];

/// Roles allowed to delete catalog records and to create user accounts.
pub fn is_privileged(role: &str) -> bool {
    role.eq_ignore_ascii_case(ROLE_ADMIN) || role.eq_ignore_ascii_case(ROLE_MANAGER)
}

pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.iter().any(|r| r.eq_ignore_ascii_case(role.trim()))
}
