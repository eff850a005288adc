//! Namespace → actor registry.
//!
//! [`LockRegistry`] creates a [`UniquenessActor`] the first time a namespace
//! is used and keeps it alive until [`LockRegistry::shutdown`]. All actors
//! share one [`LockStorage`]; each namespace's keys are only ever touched by
//! that namespace's actor.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use salereg_core::lock::{LockActor, LockError, LockOutcome, LockStorage};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::actor::{ActorHandle, UniquenessActor};

/// Default mailbox size per namespace.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;

/// How long shutdown waits for each actor to drain.
const SHUTDOWN_WAIT: Duration = Duration::from_secs(5);

/// Bookkeeping for one running actor.
struct ManagedActor {
    handle: ActorHandle,
    task_handle: tokio::task::JoinHandle<()>,
}

/// Owns every namespace actor and routes lock calls to them.
pub struct LockRegistry {
    storage: Arc<dyn LockStorage>,
    actors: RwLock<HashMap<String, ManagedActor>>,
    mailbox_capacity: usize,
    /// Master cancellation token, cancelled during shutdown.
    cancel: CancellationToken,
}

impl LockRegistry {
    pub fn new(storage: Arc<dyn LockStorage>) -> Self {
        Self::with_capacity(storage, DEFAULT_MAILBOX_CAPACITY)
    }

    pub fn with_capacity(storage: Arc<dyn LockStorage>, mailbox_capacity: usize) -> Self {
        Self {
            storage,
            actors: RwLock::new(HashMap::new()),
            mailbox_capacity,
            cancel: CancellationToken::new(),
        }
    }

    /// Handle for `namespace`, spawning its actor on first use.
    pub async fn actor(&self, namespace: &str) -> Result<ActorHandle, LockError> {
        if let Some(managed) = self.actors.read().await.get(namespace) {
            return Ok(managed.handle.clone());
        }

        if self.cancel.is_cancelled() {
            return Err(LockError::Unavailable("lock registry is shut down".to_string()));
        }

        let mut actors = self.actors.write().await;
        // Another caller may have spawned it while we waited for the write lock.
        if let Some(managed) = actors.get(namespace) {
            return Ok(managed.handle.clone());
        }
        if self.cancel.is_cancelled() {
            return Err(LockError::Unavailable("lock registry is shut down".to_string()));
        }

        let (actor, handle) =
            UniquenessActor::new(namespace, Arc::clone(&self.storage), self.mailbox_capacity);
        let task_handle = tokio::spawn(actor.run(self.cancel.child_token()));
        tracing::info!(namespace, "Spawned uniqueness actor");

        actors.insert(
            namespace.to_string(),
            ManagedActor {
                handle: handle.clone(),
                task_handle,
            },
        );
        Ok(handle)
    }

    /// Namespaces with a running actor.
    pub async fn namespaces(&self) -> Vec<String> {
        self.actors.read().await.keys().cloned().collect()
    }

    /// Stop every actor, letting each answer commands already queued.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down lock registry");
        self.cancel.cancel();

        let mut actors = self.actors.write().await;
        for (namespace, managed) in actors.drain() {
            drop(managed.handle);
            if tokio::time::timeout(SHUTDOWN_WAIT, managed.task_handle)
                .await
                .is_err()
            {
                tracing::warn!(namespace = %namespace, "Uniqueness actor did not stop in time");
            }
        }

        tracing::info!("Lock registry shut down complete");
    }
}

#[async_trait]
impl LockActor for LockRegistry {
    async fn check_and_lock(&self, namespace: &str, key: &str) -> Result<LockOutcome, LockError> {
        self.actor(namespace).await?.check_and_lock(key).await
    }

    async fn unlock(&self, namespace: &str, key: &str) -> Result<(), LockError> {
        self.actor(namespace).await?.unlock(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLockStorage;
    use assert_matches::assert_matches;
    use salereg_core::lock::LockStorageError;

    /// Storage whose every call fails.
    struct BrokenStorage;

    #[async_trait]
    impl LockStorage for BrokenStorage {
        async fn contains(&self, _: &str, _: &str) -> Result<bool, LockStorageError> {
            Err(LockStorageError("connection refused".into()))
        }

        async fn insert(&self, _: &str, _: &str) -> Result<bool, LockStorageError> {
            Err(LockStorageError("connection refused".into()))
        }

        async fn remove(&self, _: &str, _: &str) -> Result<(), LockStorageError> {
            Err(LockStorageError("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn actors_are_created_once_per_namespace() {
        let registry = LockRegistry::new(Arc::new(MemoryLockStorage::new()));

        registry.check_and_lock("global", "A").await.unwrap();
        registry.check_and_lock("global", "B").await.unwrap();
        registry.check_and_lock("seller:S1", "A").await.unwrap();

        let mut namespaces = registry.namespaces().await;
        namespaces.sort();
        assert_eq!(namespaces, vec!["global".to_string(), "seller:S1".to_string()]);
    }

    #[tokio::test]
    async fn namespaces_are_independent() {
        let registry = LockRegistry::new(Arc::new(MemoryLockStorage::new()));

        assert_eq!(
            registry.check_and_lock("seller:S1", "A").await,
            Ok(LockOutcome::LockedNew)
        );
        assert_eq!(
            registry.check_and_lock("seller:S2", "A").await,
            Ok(LockOutcome::LockedNew)
        );
        assert_eq!(
            registry.check_and_lock("seller:S1", "A").await,
            Ok(LockOutcome::AlreadyLocked)
        );
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_unavailable() {
        let registry = LockRegistry::new(Arc::new(BrokenStorage));

        assert_matches!(
            registry.check_and_lock("global", "A").await,
            Err(LockError::Unavailable(msg)) if msg.contains("connection refused")
        );
        assert_matches!(
            registry.unlock("global", "A").await,
            Err(LockError::Unavailable(_))
        );
    }

    #[tokio::test]
    async fn lock_state_survives_actor_restart() {
        let storage = Arc::new(MemoryLockStorage::new());

        let first = LockRegistry::new(storage.clone());
        first.check_and_lock("global", "A").await.unwrap();
        first.shutdown().await;

        let second = LockRegistry::new(storage);
        assert_eq!(
            second.check_and_lock("global", "A").await,
            Ok(LockOutcome::AlreadyLocked)
        );
    }

    #[tokio::test]
    async fn calls_after_shutdown_are_unavailable() {
        let registry = LockRegistry::new(Arc::new(MemoryLockStorage::new()));
        registry.check_and_lock("global", "A").await.unwrap();
        registry.shutdown().await;

        assert_matches!(
            registry.check_and_lock("global", "B").await,
            Err(LockError::Unavailable(_))
        );
        assert!(registry.namespaces().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_locks_on_one_key_have_one_winner() {
        let registry = Arc::new(LockRegistry::new(Arc::new(MemoryLockStorage::new())));

        let attempts = (0..64).map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.check_and_lock("global", "X").await })
        });
        let outcomes: Vec<LockOutcome> = futures::future::join_all(attempts)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .collect();

        let winners = outcomes
            .iter()
            .filter(|o| **o == LockOutcome::LockedNew)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(outcomes.len(), 64);
    }
}
