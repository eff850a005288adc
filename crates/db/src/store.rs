//! PostgreSQL implementations of the core storage traits.
//!
//! [`PgSaleStore`] backs [`SaleStore`] with the `sales` table and
//! [`PgLockStorage`] backs the lock actors' [`LockStorage`] with
//! `imei_locks`. Both are thin adapters over the repositories that map
//! `sqlx::Error` into the core error types.

use async_trait::async_trait;
use salereg_core::lock::{LockStorage, LockStorageError};
use salereg_core::sale::{NewSale, SaleFilter, SaleRecord};
use salereg_core::store::{SaleStore, StoreError};

use crate::repositories::{ImeiLockRepo, SaleRepo};
use crate::DbPool;

/// PostgreSQL error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL error code for `check_violation`.
const CHECK_VIOLATION: &str = "23514";

/// Map a sqlx error to a [`StoreError`].
///
/// - Unique and check constraint violations map to `ConstraintViolation`
///   carrying the constraint name.
/// - Everything else (pool timeouts, I/O, protocol errors) maps to `Unavailable`.
pub fn classify_store_error(err: &sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = err {
        let code = db_err.code();
        if matches!(code.as_deref(), Some(UNIQUE_VIOLATION) | Some(CHECK_VIOLATION)) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return StoreError::ConstraintViolation(constraint.to_string());
        }
    }
    StoreError::Unavailable(err.to_string())
}

// ---------------------------------------------------------------------------
// Sale store
// ---------------------------------------------------------------------------

/// [`SaleStore`] over the `sales` table.
#[derive(Clone)]
pub struct PgSaleStore {
    pool: DbPool,
}

impl PgSaleStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SaleStore for PgSaleStore {
    async fn insert(&self, sale: &NewSale) -> Result<SaleRecord, StoreError> {
        SaleRepo::create(&self.pool, sale)
            .await
            .map(SaleRecord::from)
            .map_err(|e| {
                let mapped = classify_store_error(&e);
                tracing::warn!(sale_id = %sale.sale_id, imei = %sale.imei, error = %e, "Sale insert failed");
                mapped
            })
    }

    async fn query(&self, filter: &SaleFilter) -> Result<Vec<SaleRecord>, StoreError> {
        let rows = SaleRepo::list(&self.pool, filter)
            .await
            .map_err(|e| classify_store_error(&e))?;
        Ok(rows.into_iter().map(SaleRecord::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Lock storage
// ---------------------------------------------------------------------------

/// [`LockStorage`] over the `imei_locks` table.
#[derive(Clone)]
pub struct PgLockStorage {
    pool: DbPool,
}

impl PgLockStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn lock_storage_error(err: sqlx::Error) -> LockStorageError {
    tracing::error!(error = %err, "Lock storage query failed");
    LockStorageError(err.to_string())
}

#[async_trait]
impl LockStorage for PgLockStorage {
    async fn contains(&self, namespace: &str, key: &str) -> Result<bool, LockStorageError> {
        ImeiLockRepo::exists(&self.pool, namespace, key)
            .await
            .map_err(lock_storage_error)
    }

    async fn insert(&self, namespace: &str, key: &str) -> Result<bool, LockStorageError> {
        ImeiLockRepo::insert(&self.pool, namespace, key)
            .await
            .map_err(lock_storage_error)
    }

    async fn remove(&self, namespace: &str, key: &str) -> Result<(), LockStorageError> {
        ImeiLockRepo::delete(&self.pool, namespace, key)
            .await
            .map(|_| ())
            .map_err(lock_storage_error)
    }
}
