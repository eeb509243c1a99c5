//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or any Postgres executor) as the first argument.

pub mod branch_repo;
pub mod catalog_repo;
pub mod circle_repo;
pub mod cluster_repo;
pub mod named_entity_repo;
pub mod trip_leg_repo;
pub mod user_repo;

pub use branch_repo::BranchRepo;
pub use catalog_repo::CatalogRepo;
pub use circle_repo::CircleRepo;
pub use cluster_repo::ClusterRepo;
pub use named_entity_repo::NamedEntityRepo;
pub use trip_leg_repo::TripLegRepo;
pub use user_repo::UserRepo;
