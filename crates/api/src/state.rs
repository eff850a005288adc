use std::sync::Arc;

use salereg_actor::LockRegistry;
use salereg_core::registration::RegistrationCoordinator;
use salereg_core::store::SaleStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: salereg_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Namespace lock actors.
    pub locks: Arc<LockRegistry>,
    /// Sale store used for reads.
    pub sales: Arc<dyn SaleStore>,
    /// The registration saga.
    pub coordinator: Arc<RegistrationCoordinator>,
}

impl AppState {
    /// Wire the coordinator from its collaborators using the configured
    /// lock scope and store timeout.
    pub fn new(
        pool: salereg_db::DbPool,
        config: ServerConfig,
        locks: Arc<LockRegistry>,
        sales: Arc<dyn SaleStore>,
    ) -> Self {
        let coordinator = RegistrationCoordinator::new(locks.clone(), Arc::clone(&sales))
            .with_scope(config.lock_scope)
            .with_store_timeout(config.store_timeout());

        Self {
            pool,
            config: Arc::new(config),
            locks,
            sales,
            coordinator: Arc::new(coordinator),
        }
    }
}
