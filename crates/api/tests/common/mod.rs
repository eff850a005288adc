#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use salereg_actor::{LockRegistry, MemoryLockStorage};
use salereg_api::config::{LockBackend, ServerConfig};
use salereg_api::router::build_app_router;
use salereg_api::state::AppState;
use salereg_core::lock::LockScope;
use salereg_core::store::SaleStore;
use salereg_db::PgSaleStore;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// global lock scope and in-memory lock storage.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        lock_scope: LockScope::Global,
        lock_backend: LockBackend::Memory,
        store_timeout_ms: 5000,
        actor_mailbox_capacity: 64,
    }
}

/// Build the full application router over the given pool, with sales in
/// Postgres and locks in memory.
pub fn build_test_app(pool: PgPool) -> Router {
    let sales = Arc::new(PgSaleStore::new(pool.clone()));
    build_test_app_with_store(pool, sales)
}

/// Same as [`build_test_app`] but with a caller-supplied sale store.
pub fn build_test_app_with_store(pool: PgPool, sales: Arc<dyn SaleStore>) -> Router {
    let config = test_config();
    let locks = Arc::new(LockRegistry::with_capacity(
        Arc::new(MemoryLockStorage::new()),
        config.actor_mailbox_capacity,
    ));
    let state = AppState::new(pool, config.clone(), locks, sales);
    build_app_router(state, &config).expect("test router should build")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_as_seller(app: Router, uri: &str, seller: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("x-seller-id", seller)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a JSON body, optionally identifying the caller with `X-Seller-ID`.
pub async fn post_json_seller(
    app: Router,
    uri: &str,
    seller: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(seller) = seller {
        builder = builder.header("x-seller-id", seller);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
