//! Repository for the `sales` table.

use salereg_core::sale::{NewSale, SaleFilter};
use sqlx::PgPool;

use crate::models::sale::Sale;

/// Column list for `sales` queries.
const COLUMNS: &str = "\
    id, seller_id, imei, phone_model, sale_date, city, phone_number, created_at";

/// Provides insert and read operations for sale records. Rows are never updated.
pub struct SaleRepo;

impl SaleRepo {
    /// Insert a new sale, returning the created row.
    ///
    /// Fails with a unique violation on `uq_sales_imei` if the IMEI is
    /// already recorded.
    pub async fn create(pool: &PgPool, input: &NewSale) -> Result<Sale, sqlx::Error> {
        let query = format!(
            "INSERT INTO sales (id, seller_id, imei, phone_model, sale_date, city, phone_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sale>(&query)
            .bind(input.sale_id)
            .bind(&input.seller_id)
            .bind(input.imei.as_str())
            .bind(&input.phone_model)
            .bind(input.sale_date)
            .bind(input.city.as_deref())
            .bind(input.phone_number.as_deref())
            .fetch_one(pool)
            .await
    }

    /// List sales matching `filter`, newest first.
    pub async fn list(pool: &PgPool, filter: &SaleFilter) -> Result<Vec<Sale>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sales \
             WHERE ($1::TEXT IS NULL OR seller_id = $1) \
               AND ($2::TEXT IS NULL OR imei = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Sale>(&query)
            .bind(filter.seller_id.as_deref())
            .bind(filter.imei.as_deref())
            .bind(filter.effective_limit())
            .bind(filter.effective_offset())
            .fetch_all(pool)
            .await
    }

    /// Find the sale recorded for an IMEI, if any.
    pub async fn find_by_imei(pool: &PgPool, imei: &str) -> Result<Option<Sale>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sales WHERE imei = $1");
        sqlx::query_as::<_, Sale>(&query)
            .bind(imei)
            .fetch_optional(pool)
            .await
    }

    /// Total number of recorded sales.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sales")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
