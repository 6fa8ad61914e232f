//! File-based Session Store Adapter
//!
//! Stores each blob as a YAML file under `{base}/{scope}/{digest}.yaml`,
//! where the digest is the SHA-256 of the scope id so arbitrary channel ids
//! are safe file names.
//!
//! Writes go to a temporary file first and are renamed into place. Within
//! `save_all` every temporary file is written before any rename, so a
//! failure while writing leaves all previous files untouched. If a rename
//! fails part way, the files already renamed are put back to their previous
//! contents and the remaining temporary files are removed. A crash between
//! two renames can still leave a mix of old and new files.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::ports::{ScopeKey, SessionStore, SessionStoreError, StateBlob};

/// File-based storage for scoped state
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileSessionStore {
    /// Create a new file store with a base directory
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSessionStore::new("./data/state");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get the file path for a key
    fn blob_path(&self, key: &ScopeKey) -> PathBuf {
        let digest = Sha256::digest(key.id.as_bytes());
        self.base_path
            .join(key.kind.as_str())
            .join(format!("{:x}.yaml", digest))
    }

    fn temp_path(path: &Path) -> PathBuf {
        path.with_extension("yaml.tmp")
    }

    async fn read_blob(&self, key: &ScopeKey) -> Result<Option<StateBlob>, SessionStoreError> {
        let path = self.blob_path(key);
        if !fs::try_exists(&path).await.map_err(io_error)? {
            return Ok(None);
        }

        let yaml = fs::read_to_string(&path).await.map_err(io_error)?;
        let blob = serde_yaml::from_str(&yaml)
            .map_err(|e| SessionStoreError::DeserializationFailed(e.to_string()))?;
        Ok(Some(blob))
    }

    async fn check_revision(&self, key: &ScopeKey, blob: &StateBlob) -> Result<(), SessionStoreError> {
        let found = self
            .read_blob(key)
            .await?
            .map(|stored| stored.revision)
            .unwrap_or(0);
        if found != blob.revision {
            return Err(SessionStoreError::RevisionConflict {
                key: key.clone(),
                expected: blob.revision,
                found,
            });
        }
        Ok(())
    }

    /// Writes the next revision of `blob` to a temporary file, remembering
    /// what the final file held so a failed commit can put it back.
    async fn stage(&self, key: &ScopeKey, blob: &StateBlob) -> Result<Staged, SessionStoreError> {
        let path = self.blob_path(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await.map_err(io_error)?;
        }

        let previous = if fs::try_exists(&path).await.map_err(io_error)? {
            Some(fs::read_to_string(&path).await.map_err(io_error)?)
        } else {
            None
        };

        let revision = blob.revision + 1;
        let yaml = serde_yaml::to_string(&blob.clone().at_revision(revision))
            .map_err(|e| SessionStoreError::SerializationFailed(e.to_string()))?;

        let temp = Self::temp_path(&path);
        fs::write(&temp, yaml).await.map_err(io_error)?;
        Ok(Staged {
            temp,
            path,
            previous,
            revision,
        })
    }

    async fn discard(staged: &[Staged]) {
        for entry in staged {
            let _ = fs::remove_file(&entry.temp).await;
        }
    }

    /// Renames every staged file into place, or none of them.
    async fn commit(staged: &[Staged]) -> Result<(), SessionStoreError> {
        for (done, entry) in staged.iter().enumerate() {
            if let Err(err) = fs::rename(&entry.temp, &entry.path).await {
                warn!(
                    path = %entry.path.display(),
                    error = %err,
                    "Rename failed, restoring previously committed files"
                );
                Self::restore(&staged[..done]).await;
                Self::discard(&staged[done..]).await;
                return Err(io_error(err));
            }
        }
        Ok(())
    }

    async fn restore(committed: &[Staged]) {
        for entry in committed {
            let restored = match &entry.previous {
                Some(contents) => fs::write(&entry.path, contents).await,
                None => fs::remove_file(&entry.path).await,
            };
            if let Err(err) = restored {
                error!(
                    path = %entry.path.display(),
                    error = %err,
                    "Failed to restore file after aborted save"
                );
            }
        }
    }
}

/// A blob written to its temporary file but not yet renamed into place.
#[derive(Debug)]
struct Staged {
    temp: PathBuf,
    path: PathBuf,
    /// Contents of `path` before this write; `None` when it did not exist.
    previous: Option<String>,
    revision: u64,
}

fn io_error(err: std::io::Error) -> SessionStoreError {
    SessionStoreError::IoError(err.to_string())
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, key: &ScopeKey) -> Result<Option<StateBlob>, SessionStoreError> {
        self.read_blob(key).await
    }

    async fn save(&self, key: &ScopeKey, blob: &StateBlob) -> Result<u64, SessionStoreError> {
        let _guard = self.write_lock.lock().await;
        self.check_revision(key, blob).await?;

        let staged = self.stage(key, blob).await?;
        Self::commit(std::slice::from_ref(&staged)).await?;
        Ok(staged.revision)
    }

    async fn save_all(&self, writes: &[(ScopeKey, StateBlob)]) -> Result<(), SessionStoreError> {
        let _guard = self.write_lock.lock().await;
        for (key, blob) in writes {
            self.check_revision(key, blob).await?;
        }

        let mut staged = Vec::with_capacity(writes.len());
        for (key, blob) in writes {
            match self.stage(key, blob).await {
                Ok(entry) => staged.push(entry),
                Err(err) => {
                    Self::discard(&staged).await;
                    return Err(err);
                }
            }
        }

        Self::commit(&staged).await
    }

    async fn delete(&self, key: &ScopeKey) -> Result<(), SessionStoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.blob_path(key);
        if fs::try_exists(&path).await.map_err(io_error)? {
            fs::remove_file(&path).await.map_err(io_error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileSessionStore) {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_file_store_save_and_load() {
        let (_dir, store) = store();
        let key = ScopeKey::conversation("19:abc@thread.skype");

        store
            .save(&key, &StateBlob::new(json!({"dialogStack": []})))
            .await
            .unwrap();
        let loaded = store.load(&key).await.unwrap().unwrap();

        assert_eq!(loaded.revision, 1);
        assert_eq!(loaded.data, json!({"dialogStack": []}));
    }

    #[tokio::test]
    async fn test_file_store_missing_key_is_none() {
        let (_dir, store) = store();

        assert_eq!(store.load(&ScopeKey::user("nobody")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_file_names_are_digests() {
        let (dir, store) = store();
        let key = ScopeKey::user("../../etc/passwd");

        store.save(&key, &StateBlob::new(json!(1))).await.unwrap();

        let path = store.blob_path(&key);
        assert!(path.starts_with(dir.path().join("user")));
        assert_eq!(path.file_stem().map(|s| s.len()), Some(64));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_store_save_all_rejects_stale_blob() {
        let (_dir, store) = store();
        let user = ScopeKey::user("u-1");
        let conversation = ScopeKey::conversation("c-1");
        store.save(&user, &StateBlob::new(json!("v1"))).await.unwrap();

        let result = store
            .save_all(&[
                (conversation.clone(), StateBlob::new(json!("c"))),
                (user.clone(), StateBlob::new(json!("stale"))),
            ])
            .await;

        assert!(result.unwrap_err().is_conflict());
        assert_eq!(store.load(&conversation).await.unwrap(), None);
        assert_eq!(store.load(&user).await.unwrap().unwrap().data, json!("v1"));
    }

    #[tokio::test]
    async fn test_file_store_save_all_bumps_every_revision() {
        let (_dir, store) = store();
        let user = ScopeKey::user("u-1");
        let conversation = ScopeKey::conversation("c-1");

        store
            .save_all(&[
                (conversation.clone(), StateBlob::new(json!("c"))),
                (user.clone(), StateBlob::new(json!("u"))),
            ])
            .await
            .unwrap();
        let loaded = store.load(&user).await.unwrap().unwrap();
        store
            .save_all(&[(user.clone(), StateBlob::new(json!("u2")).at_revision(loaded.revision))])
            .await
            .unwrap();

        assert_eq!(store.load(&user).await.unwrap().unwrap().revision, 2);
        assert_eq!(store.load(&conversation).await.unwrap().unwrap().revision, 1);
    }

    #[tokio::test]
    async fn test_file_store_failed_rename_restores_earlier_files() {
        let (dir, store) = store();
        let user = ScopeKey::user("u-1");
        let conversation = ScopeKey::conversation("c-1");
        store.save(&user, &StateBlob::new(json!("v1"))).await.unwrap();

        let staged = vec![
            store
                .stage(&user, &StateBlob::new(json!("v2")).at_revision(1))
                .await
                .unwrap(),
            store
                .stage(&conversation, &StateBlob::new(json!("c")))
                .await
                .unwrap(),
        ];
        // Second rename fails because its source is gone.
        std::fs::remove_file(&staged[1].temp).unwrap();

        let result = FileSessionStore::commit(&staged).await;

        assert!(result.is_err());
        let restored = store.load(&user).await.unwrap().unwrap();
        assert_eq!(restored.revision, 1);
        assert_eq!(restored.data, json!("v1"));
        assert_eq!(store.load(&conversation).await.unwrap(), None);
        assert!(!staged[0].temp.exists());
        for scope in ["user", "conversation"] {
            let leftovers = std::fs::read_dir(dir.path().join(scope))
                .unwrap()
                .filter_map(Result::ok)
                .filter(|entry| entry.path().to_string_lossy().ends_with(".tmp"))
                .count();
            assert_eq!(leftovers, 0);
        }
    }

    #[tokio::test]
    async fn test_file_store_failed_rename_removes_newly_created_files() {
        let (_dir, store) = store();
        let conversation = ScopeKey::conversation("c-1");
        let user = ScopeKey::user("u-1");

        let staged = vec![
            store
                .stage(&conversation, &StateBlob::new(json!("c")))
                .await
                .unwrap(),
            store.stage(&user, &StateBlob::new(json!("u"))).await.unwrap(),
        ];
        std::fs::remove_file(&staged[1].temp).unwrap();

        assert!(FileSessionStore::commit(&staged).await.is_err());
        assert_eq!(store.load(&conversation).await.unwrap(), None);
        assert!(!staged[0].path.exists());
    }

    #[tokio::test]
    async fn test_file_store_delete() {
        let (_dir, store) = store();
        let key = ScopeKey::conversation("c-1");
        store.save(&key, &StateBlob::new(json!(1))).await.unwrap();

        store.delete(&key).await.unwrap();

        assert_eq!(store.load(&key).await.unwrap(), None);
        assert!(store.delete(&key).await.is_ok());
    }
}
