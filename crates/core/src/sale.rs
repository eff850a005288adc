//! Sale registration requests, validated sales, and committed sale records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::imei::{validate_imei, Imei};
use crate::types::{SaleId, Timestamp};

// ---------------------------------------------------------------------------
// Registration request
// ---------------------------------------------------------------------------

/// A request to register one device sale. Never persisted.
///
/// `seller_id` is supplied by the authentication layer, not by the client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegistrationRequest {
    #[validate(custom(function = "non_blank", message = "seller_id is required"))]
    pub seller_id: String,
    #[validate(custom(function = "validate_imei"))]
    pub imei: String,
    #[validate(custom(function = "non_blank", message = "phone_model is required"))]
    pub phone_model: String,
    #[validate(custom(function = "validate_sale_date"))]
    pub sale_date: String,
    pub city: Option<String>,
    pub phone_number: Option<String>,
}

/// A request that passed validation, with typed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRegistration {
    pub seller_id: String,
    pub imei: Imei,
    pub phone_model: String,
    pub sale_date: NaiveDate,
    pub city: Option<String>,
    pub phone_number: Option<String>,
}

impl RegistrationRequest {
    /// Validate every field and convert to typed values. Pure, no I/O.
    pub fn validated(&self) -> Result<ValidatedRegistration, CoreError> {
        self.validate()
            .map_err(|errors| CoreError::Validation(errors.to_string()))?;

        Ok(ValidatedRegistration {
            seller_id: self.seller_id.trim().to_string(),
            imei: Imei::parse(&self.imei)?,
            phone_model: self.phone_model.trim().to_string(),
            sale_date: parse_sale_date(&self.sale_date)?,
            city: normalize_optional(self.city.as_deref()),
            phone_number: normalize_optional(self.phone_number.as_deref()),
        })
    }
}

impl ValidatedRegistration {
    /// Attach a generated sale id, producing the record handed to the store.
    pub fn into_new_sale(self, sale_id: SaleId) -> NewSale {
        NewSale {
            sale_id,
            seller_id: self.seller_id,
            imei: self.imei,
            phone_model: self.phone_model,
            sale_date: self.sale_date,
            city: self.city,
            phone_number: self.phone_number,
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A sale about to be inserted. `created_at` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    pub sale_id: SaleId,
    pub seller_id: String,
    pub imei: Imei,
    pub phone_model: String,
    pub sale_date: NaiveDate,
    pub city: Option<String>,
    pub phone_number: Option<String>,
}

/// A committed sale. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleRecord {
    pub sale_id: SaleId,
    pub seller_id: String,
    pub imei: String,
    pub phone_model: String,
    pub sale_date: NaiveDate,
    pub city: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: Timestamp,
}

impl SaleRecord {
    /// Build the committed view of `sale` with the given server timestamp.
    pub fn committed(sale: &NewSale, created_at: Timestamp) -> Self {
        Self {
            sale_id: sale.sale_id,
            seller_id: sale.seller_id.clone(),
            imei: sale.imei.as_str().to_string(),
            phone_model: sale.phone_model.clone(),
            sale_date: sale.sale_date,
            city: sale.city.clone(),
            phone_number: sale.phone_number.clone(),
            created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Query filter
// ---------------------------------------------------------------------------

pub const DEFAULT_QUERY_LIMIT: i64 = 50;
pub const MAX_QUERY_LIMIT: i64 = 500;

/// Read-side filter for [`crate::store::SaleStore::query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleFilter {
    pub seller_id: Option<String>,
    pub imei: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SaleFilter {
    pub fn for_seller(seller_id: impl Into<String>) -> Self {
        Self {
            seller_id: Some(seller_id.into()),
            ..Self::default()
        }
    }

    pub fn for_imei(imei: impl Into<String>) -> Self {
        Self {
            imei: Some(imei.into()),
            ..Self::default()
        }
    }

    /// Effective page size, clamped to `1..=MAX_QUERY_LIMIT`.
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_QUERY_LIMIT)
            .clamp(1, MAX_QUERY_LIMIT)
    }

    /// Effective offset, never negative.
    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn non_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("required"));
    }
    Ok(())
}

fn validate_sale_date(value: &str) -> Result<(), validator::ValidationError> {
    parse_sale_date(value).map(|_| ()).map_err(|e| {
        let mut err = validator::ValidationError::new("sale_date");
        err.message = Some(e.to_string().into());
        err
    })
}

/// Parse `YYYY-MM-DD`, or an RFC 3339 timestamp whose date part is used.
pub fn parse_sale_date(raw: &str) -> Result<NaiveDate, CoreError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(CoreError::Validation("sale_date is required".to_string()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    chrono::DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.date_naive())
        .map_err(|_| {
            CoreError::Validation(format!(
                "sale_date '{value}' is not a date (expected YYYY-MM-DD)"
            ))
        })
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
