//! Row structs and input DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` struct matching the
//! database row and, where rows are created through typed code, a
//! `Deserialize` create DTO.

pub mod branch;
pub mod circle;
pub mod cluster;
pub mod named;
pub mod trip_leg;
pub mod user;
