//! core::metadata::store
//!
//! Persistence of sync metadata around command execution.
//!
//! # Architecture
//!
//! The store is the durable side of the sync metadata cache. Before a
//! command sends anything, every resource argument is reloaded so the
//! command never acts on values cached by a previous command in the same
//! session. After the response stream is consumed, every resource argument
//! is saved, whatever the outcome.
//!
//! Implementations must be `Send + Sync`; one store serves every
//! invocation that shares a [`Context`](crate::engine::Context).
//!
//! # Example
//!
//! ```
//! use cvsclient::core::metadata::store::{MemorySyncStore, SyncStore};
//! use cvsclient::core::types::ResourcePath;
//! use cvsclient::workspace::ResourceHandle;
//!
//! let store = MemorySyncStore::new();
//! let file = ResourceHandle::file(ResourcePath::new("a.txt").unwrap());
//! store.save(&file).unwrap();
//! assert_eq!(store.save_count(), 1);
//! ```

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::core::types::ResourcePath;
use crate::workspace::ResourceHandle;

/// Errors from sync metadata persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncStoreError {
    #[error("failed to reload sync info for '{path}': {message}")]
    ReloadFailed { path: String, message: String },

    #[error("failed to save sync info for '{path}': {message}")]
    SaveFailed { path: String, message: String },
}

/// Durable storage for sync metadata.
pub trait SyncStore: Send + Sync {
    /// Discard cached sync info for `resource` and read it from storage.
    fn reload(&self, resource: &ResourceHandle) -> Result<(), SyncStoreError>;

    /// Write pending sync info for `resource` to storage.
    fn save(&self, resource: &ResourceHandle) -> Result<(), SyncStoreError>;
}

/// Store for workspaces that persist their own changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSyncStore;

impl SyncStore for NullSyncStore {
    fn reload(&self, _resource: &ResourceHandle) -> Result<(), SyncStoreError> {
        Ok(())
    }

    fn save(&self, _resource: &ResourceHandle) -> Result<(), SyncStoreError> {
        Ok(())
    }
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreFailOn {
    /// Fail every reload.
    Reload,
    /// Fail every save.
    Save,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    Reload(ResourcePath),
    Save(ResourcePath),
}

/// Recording store for tests.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemorySyncStore {
    inner: Arc<Mutex<MemorySyncStoreInner>>,
}

#[derive(Debug, Default)]
struct MemorySyncStoreInner {
    fail_on: Option<StoreFailOn>,
    operations: Vec<StoreOperation>,
}

impl MemorySyncStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the store to fail on an operation.
    pub fn fail_on(self, fail_on: StoreFailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<StoreOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Number of reload calls.
    pub fn reload_count(&self) -> usize {
        self.operations()
            .iter()
            .filter(|op| matches!(op, StoreOperation::Reload(_)))
            .count()
    }

    /// Number of save calls.
    pub fn save_count(&self) -> usize {
        self.operations()
            .iter()
            .filter(|op| matches!(op, StoreOperation::Save(_)))
            .count()
    }
}

impl SyncStore for MemorySyncStore {
    fn reload(&self, resource: &ResourceHandle) -> Result<(), SyncStoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .operations
            .push(StoreOperation::Reload(resource.path().clone()));
        if inner.fail_on == Some(StoreFailOn::Reload) {
            return Err(SyncStoreError::ReloadFailed {
                path: resource.path().to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn save(&self, resource: &ResourceHandle) -> Result<(), SyncStoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .operations
            .push(StoreOperation::Save(resource.path().clone()));
        if inner.fail_on == Some(StoreFailOn::Save) {
            return Err(SyncStoreError::SaveFailed {
                path: resource.path().to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(path: &str) -> ResourceHandle {
        ResourceHandle::file(ResourcePath::new(path).unwrap())
    }

    #[test]
    fn records_operations_in_order() {
        let store = MemorySyncStore::new();
        store.reload(&handle("a")).unwrap();
        store.save(&handle("b")).unwrap();
        assert_eq!(
            store.operations(),
            vec![
                StoreOperation::Reload(ResourcePath::new("a").unwrap()),
                StoreOperation::Save(ResourcePath::new("b").unwrap()),
            ]
        );
    }

    #[test]
    fn clones_share_state() {
        let store = MemorySyncStore::new();
        let clone = store.clone();
        clone.save(&handle("a")).unwrap();
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn injected_failures_still_record() {
        let store = MemorySyncStore::new().fail_on(StoreFailOn::Save);
        assert!(store.reload(&handle("a")).is_ok());
        assert!(matches!(
            store.save(&handle("a")),
            Err(SyncStoreError::SaveFailed { .. })
        ));
        assert_eq!(store.save_count(), 1);
    }
}
