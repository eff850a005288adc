//! Integration tests for the PostgreSQL sale store and lock storage.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use salereg_core::imei::Imei;
use salereg_core::lock::{LockOutcome, LockScope, LockStorage};
use salereg_core::registration::{RegistrationCoordinator, RegistrationError};
use salereg_core::sale::{NewSale, RegistrationRequest, SaleFilter};
use salereg_core::store::{SaleStore, StoreError};
use salereg_core::types::new_sale_id;
use salereg_db::repositories::{ImeiLockRepo, SaleRepo};
use salereg_db::{PgLockStorage, PgSaleStore};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_sale(seller: &str, imei: &str) -> NewSale {
    NewSale {
        sale_id: new_sale_id(),
        seller_id: seller.to_string(),
        imei: Imei::parse(imei).unwrap(),
        phone_model: "X1".to_string(),
        sale_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        city: Some("Tehran".to_string()),
        phone_number: None,
    }
}

fn request(seller: &str, imei: &str) -> RegistrationRequest {
    RegistrationRequest {
        seller_id: seller.into(),
        imei: imei.into(),
        phone_model: "X1".into(),
        sale_date: "2024-01-01".into(),
        city: None,
        phone_number: None,
    }
}

// ---------------------------------------------------------------------------
// Sale store
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn insert_returns_committed_record(pool: PgPool) {
    let store = PgSaleStore::new(pool.clone());
    let sale = new_sale("S1", "123456789012345");

    let record = store.insert(&sale).await.unwrap();

    assert_eq!(record.sale_id, sale.sale_id);
    assert_eq!(record.imei, "123456789012345");
    assert_eq!(record.city.as_deref(), Some("Tehran"));
    assert_eq!(SaleRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_imei_is_constraint_violation(pool: PgPool) {
    let store = PgSaleStore::new(pool.clone());
    store.insert(&new_sale("S1", "123456789012345")).await.unwrap();

    let err = store
        .insert(&new_sale("S2", "123456789012345"))
        .await
        .unwrap_err();

    assert_matches!(err, StoreError::ConstraintViolation(c) if c == "uq_sales_imei");
    assert_eq!(SaleRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_sale_id_is_constraint_violation(pool: PgPool) {
    let store = PgSaleStore::new(pool);
    let first = new_sale("S1", "111111111111111");
    store.insert(&first).await.unwrap();

    let mut second = new_sale("S1", "222222222222222");
    second.sale_id = first.sale_id;
    assert_matches!(
        store.insert(&second).await,
        Err(StoreError::ConstraintViolation(_))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn query_filters_by_seller_and_imei(pool: PgPool) {
    let store = PgSaleStore::new(pool);
    store.insert(&new_sale("S1", "111111111111111")).await.unwrap();
    store.insert(&new_sale("S1", "222222222222222")).await.unwrap();
    store.insert(&new_sale("S2", "333333333333333")).await.unwrap();

    let by_seller = store.query(&SaleFilter::for_seller("S1")).await.unwrap();
    assert_eq!(by_seller.len(), 2);
    assert!(by_seller.iter().all(|r| r.seller_id == "S1"));

    let by_imei = store
        .query(&SaleFilter::for_imei("333333333333333"))
        .await
        .unwrap();
    assert_eq!(by_imei.len(), 1);
    assert_eq!(by_imei[0].seller_id, "S2");

    let page = store
        .query(&SaleFilter {
            limit: Some(1),
            ..SaleFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn closed_pool_is_unavailable(pool: PgPool) {
    let store = PgSaleStore::new(pool.clone());
    pool.close().await;

    assert_matches!(
        store.insert(&new_sale("S1", "123456789012345")).await,
        Err(StoreError::Unavailable(_))
    );
}

// ---------------------------------------------------------------------------
// Lock storage
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn lock_storage_insert_contains_remove(pool: PgPool) {
    let storage = PgLockStorage::new(pool.clone());

    assert!(!storage.contains("global", "123456789012345").await.unwrap());
    assert!(storage.insert("global", "123456789012345").await.unwrap());
    assert!(!storage.insert("global", "123456789012345").await.unwrap());
    assert!(storage.contains("global", "123456789012345").await.unwrap());
    assert!(ImeiLockRepo::find(&pool, "global", "123456789012345")
        .await
        .unwrap()
        .is_some());

    storage.remove("global", "123456789012345").await.unwrap();
    storage.remove("global", "123456789012345").await.unwrap();
    assert!(!storage.contains("global", "123456789012345").await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lock_storage_namespaces_are_disjoint(pool: PgPool) {
    let storage = PgLockStorage::new(pool);

    assert!(storage.insert("seller:S1", "123456789012345").await.unwrap());
    assert!(storage.insert("seller:S2", "123456789012345").await.unwrap());
    assert!(!storage.contains("global", "123456789012345").await.unwrap());
}

// ---------------------------------------------------------------------------
// Full saga over PostgreSQL
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn saga_over_postgres_locks_and_records(pool: PgPool) {
    let registry = Arc::new(salereg_actor::LockRegistry::new(Arc::new(
        PgLockStorage::new(pool.clone()),
    )));
    let coordinator =
        RegistrationCoordinator::new(registry.clone(), Arc::new(PgSaleStore::new(pool.clone())))
            .with_scope(LockScope::Global);

    let reg = coordinator
        .register(request("S1", "123456789012345"))
        .await
        .unwrap();
    assert!(ImeiLockRepo::exists(&pool, "global", "123456789012345")
        .await
        .unwrap());
    assert_eq!(
        SaleRepo::find_by_imei(&pool, "123456789012345")
            .await
            .unwrap()
            .map(|s| s.id),
        Some(reg.sale_id())
    );

    let err = coordinator
        .register(request("S2", "123456789012345"))
        .await
        .unwrap_err();
    assert_matches!(err, RegistrationError::DuplicateIdentifier { .. });

    registry.shutdown().await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn record_without_lock_is_still_caught_by_constraint(pool: PgPool) {
    // Simulates a coordinator that bypassed the actor: a row exists but no lock.
    SaleRepo::create(&pool, &new_sale("S1", "123456789012345"))
        .await
        .unwrap();

    let registry = Arc::new(salereg_actor::LockRegistry::new(Arc::new(
        PgLockStorage::new(pool.clone()),
    )));
    let coordinator =
        RegistrationCoordinator::new(registry.clone(), Arc::new(PgSaleStore::new(pool.clone())));

    let err = coordinator
        .register(request("S2", "123456789012345"))
        .await
        .unwrap_err();

    assert_matches!(
        err,
        RegistrationError::StoreWriteFailed {
            source: StoreError::ConstraintViolation(_),
            ..
        }
    );
    // Compensation removed the lock this attempt took.
    assert!(!ImeiLockRepo::exists(&pool, "global", "123456789012345")
        .await
        .unwrap());
    assert_eq!(
        registry
            .actor("global")
            .await
            .unwrap()
            .check_and_lock("123456789012345")
            .await
            .unwrap(),
        LockOutcome::LockedNew
    );

    registry.shutdown().await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_registrations_over_postgres(pool: PgPool) {
    let registry = Arc::new(salereg_actor::LockRegistry::new(Arc::new(
        PgLockStorage::new(pool.clone()),
    )));
    let coordinator = Arc::new(RegistrationCoordinator::new(
        registry.clone(),
        Arc::new(PgSaleStore::new(pool.clone())),
    ));

    let attempts = (0..10).map(|i| {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            coordinator
                .register(request(&format!("S{i}"), "356938035643809"))
                .await
        })
    });
    let results = futures::future::join_all(attempts).await;

    let registered = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
    assert_eq!(registered, 1);
    assert_eq!(SaleRepo::count(&pool).await.unwrap(), 1);

    registry.shutdown().await;
}
