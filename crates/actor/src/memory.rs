//! In-process lock storage, used for development and tests.

use std::collections::HashSet;

use async_trait::async_trait;
use salereg_core::lock::{LockStorage, LockStorageError};
use tokio::sync::RwLock;

/// Lock key set held in memory. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryLockStorage {
    keys: RwLock<HashSet<(String, String)>>,
}

impl MemoryLockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of locked keys across all namespaces.
    pub async fn len(&self) -> usize {
        self.keys.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.keys.read().await.is_empty()
    }
}

fn entry(namespace: &str, key: &str) -> (String, String) {
    (namespace.to_string(), key.to_string())
}

#[async_trait]
impl LockStorage for MemoryLockStorage {
    async fn contains(&self, namespace: &str, key: &str) -> Result<bool, LockStorageError> {
        Ok(self.keys.read().await.contains(&entry(namespace, key)))
    }

    async fn insert(&self, namespace: &str, key: &str) -> Result<bool, LockStorageError> {
        Ok(self.keys.write().await.insert(entry(namespace, key)))
    }

    async fn remove(&self, namespace: &str, key: &str) -> Result<(), LockStorageError> {
        self.keys.write().await.remove(&entry(namespace, key));
        Ok(())
    }
}
