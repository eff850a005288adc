//! Registration coordinator: the lock / write / compensate saga.
//!
//! [`RegistrationCoordinator::register`] is the only way a sale record is
//! created. It validates the request, takes the IMEI lock through the
//! [`LockActor`], writes the record through the [`SaleStore`] and, if the
//! write fails for any reason, releases the lock again before reporting the
//! failure. Store timeouts count as failures.
//!
//! The coordinator holds no per-request state and can be shared behind an
//! `Arc` across any number of concurrent requests.

use std::sync::Arc;
use std::time::Duration;

use crate::error::CoreError;
use crate::lock::{LockActor, LockError, LockOutcome, LockScope};
use crate::sale::{RegistrationRequest, SaleRecord, ValidatedRegistration};
use crate::store::{SaleStore, StoreError};
use crate::types::{new_sale_id, SaleId};

/// Default bound on a single store insert.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A successfully committed registration. The IMEI stays locked for good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub record: SaleRecord,
}

impl Registration {
    pub fn sale_id(&self) -> SaleId {
        self.record.sale_id
    }
}

/// Every way a registration can fail.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// Bad input. Nothing was locked or written.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The IMEI is already registered (or being registered).
    #[error("IMEI {imei} is already registered")]
    DuplicateIdentifier { imei: String },

    /// Uniqueness could not be verified. Nothing was locked or written.
    #[error("Uniqueness could not be verified: {0}")]
    CoordinationUnavailable(#[source] LockError),

    /// The lock was taken, the write failed, and the lock was released.
    #[error("Failed to store sale for IMEI {imei}: {source}")]
    StoreWriteFailed {
        imei: String,
        #[source]
        source: StoreError,
    },

    /// The write failed and releasing the lock failed too. The IMEI is now
    /// locked with no sale record and needs manual repair.
    #[error(
        "Failed to store sale for IMEI {imei} ({store_error}) and failed to release its lock ({unlock_error})"
    )]
    CompensationFailed {
        imei: String,
        store_error: StoreError,
        unlock_error: LockError,
    },
}

impl RegistrationError {
    /// True for the one outcome that leaves a ghost lock behind.
    pub fn needs_manual_intervention(&self) -> bool {
        matches!(self, Self::CompensationFailed { .. })
    }

    /// Stable machine-readable code for transports and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicateIdentifier { .. } => "DUPLICATE_IMEI",
            Self::CoordinationUnavailable(_) => "COORDINATION_UNAVAILABLE",
            Self::StoreWriteFailed { .. } => "STORE_WRITE_FAILED",
            Self::CompensationFailed { .. } => "COMPENSATION_FAILED",
        }
    }
}

pub type RegistrationResult = Result<Registration, RegistrationError>;

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Orchestrates one registration across the lock actor and the sale store.
#[derive(Clone)]
pub struct RegistrationCoordinator {
    actor: Arc<dyn LockActor>,
    store: Arc<dyn SaleStore>,
    scope: LockScope,
    store_timeout: Duration,
}

impl RegistrationCoordinator {
    pub fn new(actor: Arc<dyn LockActor>, store: Arc<dyn SaleStore>) -> Self {
        Self {
            actor,
            store,
            scope: LockScope::default(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_scope(mut self, scope: LockScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn scope(&self) -> LockScope {
        self.scope
    }

    /// Register one sale.
    ///
    /// Validation runs on the caller's task. From the lock step onward the
    /// saga runs on a spawned task, so dropping the returned future (request
    /// timeout, client disconnect) cannot stop it between the lock and the
    /// write or its compensation.
    pub async fn register(&self, request: RegistrationRequest) -> RegistrationResult {
        let valid = request.validated()?;

        match tokio::spawn(self.clone().run_saga(valid)).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                tracing::error!(error = %e, "Registration task cancelled");
                Err(RegistrationError::CoordinationUnavailable(
                    LockError::Unavailable("registration task cancelled".to_string()),
                ))
            }
        }
    }

    async fn run_saga(self, valid: ValidatedRegistration) -> RegistrationResult {
        let namespace = self.scope.namespace_for(&valid.seller_id);
        let imei = valid.imei.clone();

        match self.actor.check_and_lock(&namespace, imei.as_str()).await {
            Ok(LockOutcome::LockedNew) => {}
            Ok(LockOutcome::AlreadyLocked) => {
                tracing::info!(%imei, seller_id = %valid.seller_id, "Duplicate IMEI rejected");
                return Err(RegistrationError::DuplicateIdentifier {
                    imei: imei.into_inner(),
                });
            }
            Err(e) => {
                tracing::warn!(%imei, namespace = %namespace, error = %e, "Lock actor unavailable");
                return Err(RegistrationError::CoordinationUnavailable(e));
            }
        }

        let sale = valid.into_new_sale(new_sale_id());

        let store_error = match tokio::time::timeout(self.store_timeout, self.store.insert(&sale))
            .await
        {
            Ok(Ok(record)) => {
                tracing::info!(
                    %imei,
                    sale_id = %record.sale_id,
                    seller_id = %record.seller_id,
                    "Sale registered",
                );
                return Ok(Registration { record });
            }
            Ok(Err(e)) => e,
            Err(_) => StoreError::Timeout(self.store_timeout),
        };

        tracing::warn!(%imei, sale_id = %sale.sale_id, error = %store_error, "Sale write failed, releasing IMEI lock");

        match self.actor.unlock(&namespace, imei.as_str()).await {
            Ok(()) => Err(RegistrationError::StoreWriteFailed {
                imei: imei.into_inner(),
                source: store_error,
            }),
            Err(unlock_error) => {
                tracing::error!(
                    alert = true,
                    %imei,
                    namespace = %namespace,
                    store_error = %store_error,
                    unlock_error = %unlock_error,
                    "Compensation failed: IMEI locked without a sale record",
                );
                Err(RegistrationError::CompensationFailed {
                    imei: imei.into_inner(),
                    store_error,
                    unlock_error,
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
