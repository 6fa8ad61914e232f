//! Session Store Port - Interface for persisting per-scope state blobs.
//!
//! State is keyed by scope: one blob per conversation and one per user.
//! The store knows nothing about what is inside a blob; encoding the dialog
//! stack and user record is the application's job.
//!
//! # Contract
//!
//! - `load` of a key that was never saved returns `Ok(None)`
//! - `save` of a blob whose revision is behind the stored one fails with
//!   `RevisionConflict`; a successful save bumps the revision
//! - `save_all` applies every write or none of them

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current encoding of persisted blobs.
pub const STATE_SCHEMA_VERSION: u32 = 1;

/// Which kind of state a key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Conversation,
    User,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Conversation => "conversation",
            ScopeKind::User => "user",
        }
    }
}

/// Address of one blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeKey {
    pub kind: ScopeKind,
    pub id: String,
}

impl ScopeKey {
    pub fn conversation(id: impl Into<String>) -> Self {
        Self {
            kind: ScopeKind::Conversation,
            id: id.into(),
        }
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self {
            kind: ScopeKind::User,
            id: id.into(),
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.as_str(), self.id)
    }
}

/// Opaque, versioned state as the store sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateBlob {
    pub schema_version: u32,
    /// Revision the blob was read at; 0 for state never saved.
    #[serde(default)]
    pub revision: u64,
    pub data: serde_json::Value,
}

impl StateBlob {
    /// A blob that has never been saved.
    pub fn new(data: serde_json::Value) -> Self {
        Self {
            schema_version: STATE_SCHEMA_VERSION,
            revision: 0,
            data,
        }
    }

    pub fn at_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }
}

/// Errors that can occur during session store operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Revision conflict for {key}: expected {expected}, found {found}")]
    RevisionConflict {
        key: ScopeKey,
        expected: u64,
        found: u64,
    },

    #[error("Failed to serialize state: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize state: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl SessionStoreError {
    /// A conflicting concurrent write, as opposed to a broken store.
    pub fn is_conflict(&self) -> bool {
        matches!(self, SessionStoreError::RevisionConflict { .. })
    }
}

/// Port for loading and saving scoped state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the blob stored under `key`
    ///
    /// # Returns
    /// `None` if nothing was ever saved under the key
    async fn load(&self, key: &ScopeKey) -> Result<Option<StateBlob>, SessionStoreError>;

    /// Save one blob, returning the new revision
    ///
    /// # Errors
    /// Returns `SessionStoreError::RevisionConflict` if another writer saved
    /// since `blob` was loaded
    async fn save(&self, key: &ScopeKey, blob: &StateBlob) -> Result<u64, SessionStoreError>;

    /// Save several blobs atomically: all of them are written or none is
    ///
    /// # Errors
    /// Fails without writing anything if any blob has a stale revision
    async fn save_all(&self, writes: &[(ScopeKey, StateBlob)]) -> Result<(), SessionStoreError>;

    /// Delete the blob under `key`; deleting a missing key is not an error
    async fn delete(&self, key: &ScopeKey) -> Result<(), SessionStoreError>;
}
