//! Durable sale store contract, plus an in-process implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::sale::{NewSale, SaleFilter, SaleRecord};

/// Failures of the durable sale store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint (IMEI or sale id) rejected the row.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The write did not complete in time. Its outcome is unknown and must
    /// be treated as a failure.
    #[error("Store write timed out after {0:?}")]
    Timeout(Duration),
}

/// Durable storage for committed sale records.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Insert exactly one record. Must reject a second record for the same IMEI.
    async fn insert(&self, sale: &NewSale) -> Result<SaleRecord, StoreError>;

    /// Committed records matching `filter`, newest first.
    async fn query(&self, filter: &SaleFilter) -> Result<Vec<SaleRecord>, StoreError>;
}

/// Non-durable [`SaleStore`] holding records in memory.
///
/// Enforces the same IMEI and sale id uniqueness as the SQL schema.
#[derive(Debug, Default)]
pub struct MemorySaleStore {
    records: RwLock<Vec<SaleRecord>>,
}

impl MemorySaleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SaleStore for MemorySaleStore {
    async fn insert(&self, sale: &NewSale) -> Result<SaleRecord, StoreError> {
        let mut records = self.records.write().await;

        if records.iter().any(|r| r.imei == sale.imei.as_str()) {
            return Err(StoreError::ConstraintViolation("uq_sales_imei".to_string()));
        }
        if records.iter().any(|r| r.sale_id == sale.sale_id) {
            return Err(StoreError::ConstraintViolation("sales_pkey".to_string()));
        }

        let record = SaleRecord::committed(sale, Utc::now());
        records.push(record.clone());
        Ok(record)
    }

    async fn query(&self, filter: &SaleFilter) -> Result<Vec<SaleRecord>, StoreError> {
        let records = self.records.read().await;

        let mut matching: Vec<SaleRecord> = records
            .iter()
            .filter(|r| filter.seller_id.as_deref().map_or(true, |s| r.seller_id == s))
            .filter(|r| filter.imei.as_deref().map_or(true, |i| r.imei == i))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.sale_id.cmp(&a.sale_id))
        });

        Ok(matching
            .into_iter()
            .skip(filter.effective_offset() as usize)
            .take(filter.effective_limit() as usize)
            .collect())
    }
}
