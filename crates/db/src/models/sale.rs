//! Sale row model.

use chrono::NaiveDate;
use salereg_core::sale::SaleRecord;
use salereg_core::types::{SaleId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `sales` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sale {
    pub id: SaleId,
    pub seller_id: String,
    pub imei: String,
    pub phone_model: String,
    pub sale_date: NaiveDate,
    pub city: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: Timestamp,
}

impl From<Sale> for SaleRecord {
    fn from(row: Sale) -> Self {
        SaleRecord {
            sale_id: row.id,
            seller_id: row.seller_id,
            imei: row.imei,
            phone_model: row.phone_model,
            sale_date: row.sale_date,
            city: row.city,
            phone_number: row.phone_number,
            created_at: row.created_at,
        }
    }
}
