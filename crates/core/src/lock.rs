//! Contracts for the uniqueness lock actor and its persistent key set.
//!
//! The actor itself lives in `salereg-actor`; the PostgreSQL key set lives
//! in `salereg-db`. Both are reached only through the traits below.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Outcomes and errors
// ---------------------------------------------------------------------------

/// Result of a `check_and_lock` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// The identifier was absent and is now locked by this call.
    LockedNew,
    /// The identifier was already present; nothing changed.
    AlreadyLocked,
}

/// Failures of the lock actor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    /// The actor could not be reached or its storage failed. Uniqueness
    /// could not be verified.
    #[error("Lock actor unavailable: {0}")]
    Unavailable(String),

    #[error("Lock identifier must not be empty")]
    InvalidIdentifier,
}

/// I/O failure of the actor's persistent key-value layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Lock storage error: {0}")]
pub struct LockStorageError(pub String);

impl From<LockStorageError> for LockError {
    fn from(err: LockStorageError) -> Self {
        LockError::Unavailable(err.0)
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Serialized check-and-lock / unlock over namespaced identifiers.
///
/// Implementations must make `check_and_lock` indivisible with respect to
/// every other operation on the same namespace.
#[async_trait]
pub trait LockActor: Send + Sync {
    async fn check_and_lock(&self, namespace: &str, key: &str) -> Result<LockOutcome, LockError>;

    /// Remove `key` unconditionally. Unlocking an absent key is a no-op.
    async fn unlock(&self, namespace: &str, key: &str) -> Result<(), LockError>;
}

/// Persistent key set backing one or more actors.
///
/// Only the actor task for a namespace calls these methods for that
/// namespace, so implementations need no cross-call atomicity beyond
/// `insert` reporting whether the key was newly added.
#[async_trait]
pub trait LockStorage: Send + Sync {
    async fn contains(&self, namespace: &str, key: &str) -> Result<bool, LockStorageError>;

    /// Add `key`. Returns `false` if it was already present.
    async fn insert(&self, namespace: &str, key: &str) -> Result<bool, LockStorageError>;

    async fn remove(&self, namespace: &str, key: &str) -> Result<(), LockStorageError>;
}

// ---------------------------------------------------------------------------
// Namespace scope
// ---------------------------------------------------------------------------

/// Namespace used when every seller shares one lock space.
pub const GLOBAL_NAMESPACE: &str = "global";

/// How the lock key space is partitioned across actors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockScope {
    /// One actor for all sellers: an IMEI is unique system-wide.
    #[default]
    Global,
    /// One actor per seller: an IMEI is unique per seller.
    PerSeller,
}

impl LockScope {
    /// Namespace key for a request made by `seller_id`.
    pub fn namespace_for(self, seller_id: &str) -> String {
        match self {
            Self::Global => GLOBAL_NAMESPACE.to_string(),
            Self::PerSeller => format!("seller:{seller_id}"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::PerSeller => "per_seller",
        }
    }
}

impl FromStr for LockScope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "global" => Ok(Self::Global),
            "per_seller" => Ok(Self::PerSeller),
            other => Err(CoreError::Validation(format!(
                "Unknown lock scope '{other}'. Must be one of: global, per_seller"
            ))),
        }
    }
}

impl fmt::Display for LockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
