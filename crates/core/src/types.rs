/// Sale records are keyed by time-ordered UUIDs (v7).
pub type SaleId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh sale id.
pub fn new_sale_id() -> SaleId {
    uuid::Uuid::now_v7()
}
