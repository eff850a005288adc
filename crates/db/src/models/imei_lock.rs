//! Lock entry row model.

use salereg_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `imei_locks` table. Its presence is the lock.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImeiLock {
    pub namespace: String,
    pub imei: String,
    pub locked_at: Timestamp,
}
