//! Row structs for the `sales` and `imei_locks` tables.

pub mod imei_lock;
pub mod sale;
