//! Pure domain logic for the fleet activity log.
//!
//! Nothing in this crate touches the database or the network. Persistence is
//! reached through the [`store::CatalogStore`] seam so the guard and the
//! import pipeline can be exercised against an in-memory store in tests.

pub mod dates;
pub mod duplicate_guard;
pub mod entity;
pub mod error;
pub mod import;
pub mod roles;
pub mod sheet;
pub mod store;
pub mod trip;
pub mod types;
