//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod imei_lock_repo;
pub mod sale_repo;

pub use imei_lock_repo::ImeiLockRepo;
pub use sale_repo::SaleRepo;
