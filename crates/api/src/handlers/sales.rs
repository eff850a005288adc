//! Handlers for sale registration and the seller's own sale list.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use salereg_core::sale::{RegistrationRequest, SaleFilter};
use salereg_core::types::SaleId;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::seller::SellerIdentity;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/v1/sales/register`. The seller comes from the header.
#[derive(Debug, Deserialize)]
pub struct RegisterSaleBody {
    pub imei: String,
    pub phone_model: String,
    pub sale_date: String,
    pub city: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredSale {
    pub sale_id: SaleId,
    pub imei: String,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/sales/register
///
/// Runs the registration saga for one device sale. Returns 201 with the new
/// sale id, or an error response whose `code` tells duplicates, validation
/// problems and storage failures apart.
pub async fn register_sale(
    State(state): State<AppState>,
    seller: SellerIdentity,
    body: Result<Json<RegisterSaleBody>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let request = RegistrationRequest {
        seller_id: seller.seller_id,
        imei: body.imei,
        phone_model: body.phone_model,
        sale_date: body.sale_date,
        city: body.city,
        phone_number: body.phone_number,
    };

    let registration = state.coordinator.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RegisteredSale {
                sale_id: registration.sale_id(),
                imei: registration.record.imei,
                message: "Sale recorded successfully.",
            },
        }),
    ))
}

/// GET /api/v1/sales
///
/// List the calling seller's sales, newest first.
pub async fn list_sales(
    State(state): State<AppState>,
    seller: SellerIdentity,
    Query(params): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = SaleFilter {
        limit: params.limit,
        offset: params.offset,
        ..SaleFilter::for_seller(seller.seller_id)
    };
    let sales = state.sales.query(&filter).await?;
    Ok(Json(DataResponse { data: sales }))
}
