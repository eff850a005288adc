//! Repository for the `imei_locks` table (the lock actor's key set).

use sqlx::PgPool;

use crate::models::imei_lock::ImeiLock;

pub struct ImeiLockRepo;

impl ImeiLockRepo {
    /// Whether `imei` is locked in `namespace`.
    pub async fn exists(pool: &PgPool, namespace: &str, imei: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM imei_locks WHERE namespace = $1 AND imei = $2)",
        )
        .bind(namespace)
        .bind(imei)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Insert a lock row. Returns `false` if the row already existed.
    pub async fn insert(pool: &PgPool, namespace: &str, imei: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO imei_locks (namespace, imei) VALUES ($1, $2) \
             ON CONFLICT (namespace, imei) DO NOTHING",
        )
        .bind(namespace)
        .bind(imei)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Delete a lock row. Deleting a missing row is not an error.
    pub async fn delete(pool: &PgPool, namespace: &str, imei: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM imei_locks WHERE namespace = $1 AND imei = $2")
            .bind(namespace)
            .bind(imei)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Fetch a lock row.
    pub async fn find(
        pool: &PgPool,
        namespace: &str,
        imei: &str,
    ) -> Result<Option<ImeiLock>, sqlx::Error> {
        sqlx::query_as::<_, ImeiLock>(
            "SELECT namespace, imei, locked_at FROM imei_locks WHERE namespace = $1 AND imei = $2",
        )
        .bind(namespace)
        .bind(imei)
        .fetch_optional(pool)
        .await
    }
}
