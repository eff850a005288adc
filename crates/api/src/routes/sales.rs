use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sales;
use crate::state::AppState;

/// Sale routes, merged into the `/api/v1` tree.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(sales::list_sales))
        .route("/sales/register", post(sales::register_sale))
}
