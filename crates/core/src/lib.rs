//! Domain types and the registration saga for IMEI sale records.
//!
//! This crate has no database or network access of its own. The lock actor
//! and the durable sale store are reached through the [`lock::LockActor`]
//! and [`store::SaleStore`] traits, implemented by `salereg-actor` and
//! `salereg-db`.

pub mod error;
pub mod imei;
pub mod lock;
pub mod registration;
pub mod sale;
pub mod store;
pub mod types;
