//! workspace
//!
//! The local resource tree a session works on.
//!
//! # Design
//!
//! The engine treats the working copy as an opaque tree addressed by
//! [`ResourcePath`]. A [`ResourceHandle`] is a plain value naming a resource;
//! every query and mutation goes through the [`Workspace`] trait, so
//! handles never borrow the tree.
//!
//! A resource is *managed* (under version control) when it has sync info:
//! folder sync info for folders, an entry for files.
//!
//! # Modules
//!
//! - [`memory`] - In-memory tree for tests and embedding

pub mod memory;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::metadata::{FolderSyncInfo, ResourceSyncInfo, SyncError};
use crate::core::types::{ResourcePath, TypeError};

/// Errors from workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The resource is missing or not under version control.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("not a folder: {0}")]
    NotAFolder(String),

    #[error("not a file: {0}")]
    NotAFile(String),

    #[error("invalid path: {0}")]
    InvalidPath(#[from] TypeError),

    #[error("sync info error: {0}")]
    Sync(#[from] SyncError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// File or folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    File,
    Folder,
}

/// Whether a handle refers to the local working copy.
///
/// Only local resources have sync metadata to reload and save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locality {
    Local,
    Remote,
}

/// A value naming a resource in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    path: ResourcePath,
    kind: ResourceKind,
    locality: Locality,
}

impl ResourceHandle {
    /// A local file handle.
    pub fn file(path: ResourcePath) -> Self {
        Self {
            path,
            kind: ResourceKind::File,
            locality: Locality::Local,
        }
    }

    /// A local folder handle.
    pub fn folder(path: ResourcePath) -> Self {
        Self {
            path,
            kind: ResourceKind::Folder,
            locality: Locality::Local,
        }
    }

    /// The same resource as seen on the remote side.
    pub fn into_remote(mut self) -> Self {
        self.locality = Locality::Remote;
        self
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ResourceKind::Folder
    }

    pub fn is_local(&self) -> bool {
        self.locality == Locality::Local
    }

    /// The folder containing this resource; the root is its own folder.
    pub fn folder_path(&self) -> ResourcePath {
        if self.is_folder() {
            self.path.clone()
        } else {
            self.path.parent().unwrap_or_default()
        }
    }
}

/// The local resource tree.
pub trait Workspace: Send {
    /// Handle of the working root.
    fn root(&self) -> ResourceHandle {
        ResourceHandle::folder(ResourcePath::root())
    }

    /// Resolve a managed descendant of the root.
    ///
    /// # Errors
    ///
    /// `WorkspaceError::NotFound` if the path is not under version control.
    fn child(&self, path: &ResourcePath) -> Result<ResourceHandle, WorkspaceError> {
        if self.is_managed_folder(path) {
            Ok(ResourceHandle::folder(path.clone()))
        } else if self.entry(path).is_some() {
            Ok(ResourceHandle::file(path.clone()))
        } else {
            Err(WorkspaceError::NotFound(path.to_string()))
        }
    }

    /// A plain handle for `path`, managed or not.
    fn plain(&self, path: &ResourcePath) -> ResourceHandle {
        if self.is_folder(path) {
            ResourceHandle::folder(path.clone())
        } else {
            ResourceHandle::file(path.clone())
        }
    }

    /// Whether anything exists at `path`.
    fn exists(&self, path: &ResourcePath) -> bool;

    /// Whether a folder exists at `path`.
    fn is_folder(&self, path: &ResourcePath) -> bool;

    /// Whether `path` is a folder under version control.
    fn is_managed_folder(&self, path: &ResourcePath) -> bool {
        self.folder_sync(path).is_some()
    }

    /// Immediate members of a folder, sorted by name.
    fn members(&self, folder: &ResourcePath) -> Result<Vec<ResourceHandle>, WorkspaceError>;

    /// Sync info of a folder.
    fn folder_sync(&self, path: &ResourcePath) -> Option<FolderSyncInfo>;

    /// Set a folder's sync info, creating the folder if needed.
    fn set_folder_sync(
        &mut self,
        path: &ResourcePath,
        info: FolderSyncInfo,
    ) -> Result<(), WorkspaceError>;

    /// Entry of a file.
    fn entry(&self, path: &ResourcePath) -> Option<ResourceSyncInfo>;

    /// Set a file's entry. The folder must exist.
    fn set_entry(&mut self, path: &ResourcePath, info: ResourceSyncInfo) -> Result<(), WorkspaceError>;

    /// Remove a file's entry; absent entries are not an error.
    fn remove_entry(&mut self, path: &ResourcePath) -> Result<(), WorkspaceError>;

    /// Modification time of a file.
    fn modification_time(&self, path: &ResourcePath) -> Option<DateTime<Utc>>;

    /// Whether a managed file differs from its recorded timestamp.
    fn is_modified(&self, path: &ResourcePath) -> bool;

    fn read_file(&self, path: &ResourcePath) -> Result<Vec<u8>, WorkspaceError>;

    /// Write a file, setting its modification time to `modified` or now.
    fn write_file(
        &mut self,
        path: &ResourcePath,
        contents: &[u8],
        modified: Option<DateTime<Utc>>,
    ) -> Result<(), WorkspaceError>;

    /// Delete a file; absent files are not an error.
    fn delete_file(&mut self, path: &ResourcePath) -> Result<(), WorkspaceError>;

    /// Copy a file to a sibling named `new_name`.
    fn copy_file(&mut self, path: &ResourcePath, new_name: &str) -> Result<(), WorkspaceError>;
}
