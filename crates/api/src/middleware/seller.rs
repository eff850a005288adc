//! Seller identity extractor.
//!
//! Authentication happens upstream; by the time a request reaches this
//! service the caller's seller id is carried in the `X-Seller-ID` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use salereg_core::error::CoreError;

use crate::error::AppError;

/// Header carrying the authenticated seller id.
pub const SELLER_ID_HEADER: &str = "x-seller-id";

/// The authenticated seller making the request.
///
/// ```ignore
/// async fn my_handler(seller: SellerIdentity) -> AppResult<Json<()>> {
///     tracing::info!(seller_id = %seller.seller_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SellerIdentity {
    pub seller_id: String,
}

impl<S> FromRequestParts<S> for SellerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let seller_id = parts
            .headers
            .get(SELLER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Authentication required: X-Seller-ID header missing".into(),
                ))
            })?;

        Ok(SellerIdentity {
            seller_id: seller_id.to_string(),
        })
    }
}
