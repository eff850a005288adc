pub mod health;
pub mod sales;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sales/register                                  register a sale (POST)
/// /sales                                           caller's sales (GET)
/// ```
///
/// Every route requires the `X-Seller-ID` header.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(sales::router())
}
