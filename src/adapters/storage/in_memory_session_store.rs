//! In-Memory Session Store Adapter
//!
//! Keeps state blobs in memory. Used for development and tests; a write
//! failure can be switched on to exercise the persistence-failure path.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{ScopeKey, SessionStore, SessionStoreError, StateBlob};

/// In-memory storage for scoped state
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    blobs: Arc<RwLock<HashMap<ScopeKey, StateBlob>>>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemorySessionStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with an IO error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful save / save_all calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Get the number of stored blobs
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.blobs.write().await.clear();
    }

    fn check_writable(&self) -> Result<(), SessionStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SessionStoreError::IoError("store is unavailable".to_string()));
        }
        Ok(())
    }
}

fn check_revision(
    blobs: &HashMap<ScopeKey, StateBlob>,
    key: &ScopeKey,
    blob: &StateBlob,
) -> Result<(), SessionStoreError> {
    let found = blobs.get(key).map(|stored| stored.revision).unwrap_or(0);
    if found != blob.revision {
        return Err(SessionStoreError::RevisionConflict {
            key: key.clone(),
            expected: blob.revision,
            found,
        });
    }
    Ok(())
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, key: &ScopeKey) -> Result<Option<StateBlob>, SessionStoreError> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn save(&self, key: &ScopeKey, blob: &StateBlob) -> Result<u64, SessionStoreError> {
        self.check_writable()?;
        let mut blobs = self.blobs.write().await;
        check_revision(&blobs, key, blob)?;

        let revision = blob.revision + 1;
        blobs.insert(key.clone(), blob.clone().at_revision(revision));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(revision)
    }

    async fn save_all(&self, writes: &[(ScopeKey, StateBlob)]) -> Result<(), SessionStoreError> {
        self.check_writable()?;
        let mut blobs = self.blobs.write().await;
        for (key, blob) in writes {
            check_revision(&blobs, key, blob)?;
        }

        for (key, blob) in writes {
            let revision = blob.revision + 1;
            blobs.insert(key.clone(), blob.clone().at_revision(revision));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &ScopeKey) -> Result<(), SessionStoreError> {
        self.check_writable()?;
        self.blobs.write().await.remove(key);
        Ok(())
    }
}
