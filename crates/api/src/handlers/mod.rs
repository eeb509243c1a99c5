pub mod auth;
pub mod catalog;
pub mod export;
pub mod import;
pub mod trip;
