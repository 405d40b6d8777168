//! workspace::memory
//!
//! In-memory [`Workspace`].
//!
//! # Design
//!
//! Resources live in a sorted map keyed by path. The root folder always
//! exists. Modification times come from an internal clock that advances one
//! second per write, so a file is modified exactly when its entry timestamp
//! differs from its formatted modification time, as on a real filesystem.
//!
//! # Example
//!
//! ```
//! use cvsclient::core::metadata::FolderSyncInfo;
//! use cvsclient::core::types::ResourcePath;
//! use cvsclient::workspace::memory::MemoryWorkspace;
//! use cvsclient::workspace::Workspace;
//!
//! let mut ws = MemoryWorkspace::new()
//!     .with_root_sync(FolderSyncInfo::new("module", "/cvsroot"))
//!     .with_managed_file("a.txt", b"one", "1.1");
//! let path = ResourcePath::new("a.txt").unwrap();
//! assert!(!ws.is_modified(&path));
//! ws.edit_file("a.txt", b"two");
//! assert!(ws.is_modified(&path));
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::{ResourceHandle, Workspace, WorkspaceError};
use crate::core::metadata::{format_entry_timestamp, FolderSyncInfo, ResourceSyncInfo};
use crate::core::types::ResourcePath;

#[derive(Debug, Clone)]
enum Node {
    Folder {
        sync: Option<FolderSyncInfo>,
    },
    File {
        contents: Vec<u8>,
        modified: DateTime<Utc>,
    },
}

/// In-memory resource tree.
///
/// Entries are kept apart from file contents, so a managed file deleted
/// locally keeps its entry until the server says otherwise.
#[derive(Debug, Clone)]
pub struct MemoryWorkspace {
    nodes: BTreeMap<ResourcePath, Node>,
    entries: BTreeMap<ResourcePath, ResourceSyncInfo>,
    clock: DateTime<Utc>,
}

impl Default for MemoryWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorkspace {
    /// An empty, unmanaged root.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ResourcePath::root(), Node::Folder { sync: None });
        Self {
            nodes,
            entries: BTreeMap::new(),
            clock: Utc.with_ymd_and_hms(2002, 1, 14, 10, 0, 0).single().unwrap_or_default(),
        }
    }

    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += Duration::seconds(1);
        self.clock
    }

    // =========================================================================
    // Builders. These panic on invalid paths and are meant for fixtures.
    // =========================================================================

    /// Builder: put the root under version control.
    pub fn with_root_sync(mut self, info: FolderSyncInfo) -> Self {
        self.nodes
            .insert(ResourcePath::root(), Node::Folder { sync: Some(info) });
        self
    }

    /// Builder: add a folder, managed when `sync` is given.
    pub fn with_folder(mut self, path: &str, sync: Option<FolderSyncInfo>) -> Self {
        let path = ResourcePath::new(path).expect("valid fixture path");
        self.ensure_parents(&path);
        self.nodes.insert(path, Node::Folder { sync });
        self
    }

    /// Builder: add an unmanaged file.
    pub fn with_file(mut self, path: &str, contents: &[u8]) -> Self {
        let path = ResourcePath::new(path).expect("valid fixture path");
        self.ensure_parents(&path);
        let modified = self.tick();
        self.nodes.insert(
            path,
            Node::File {
                contents: contents.to_vec(),
                modified,
            },
        );
        self
    }

    /// Builder: add a clean managed file at `revision`.
    pub fn with_managed_file(self, path: &str, contents: &[u8], revision: &str) -> Self {
        let mut ws = self.with_file(path, contents);
        let path = ResourcePath::new(path).expect("valid fixture path");
        let mut entry = ResourceSyncInfo::new(path.name(), revision);
        entry.timestamp = format_entry_timestamp(&ws.clock);
        ws.entries.insert(path, entry);
        ws
    }

    /// Change a file's contents as a user edit would, bumping its time.
    pub fn edit_file(&mut self, path: &str, contents: &[u8]) {
        let path = ResourcePath::new(path).expect("valid fixture path");
        let now = self.tick();
        if let Some(Node::File {
            contents: current,
            modified,
        }) = self.nodes.get_mut(&path)
        {
            *current = contents.to_vec();
            *modified = now;
        }
    }

    fn ensure_parents(&mut self, path: &ResourcePath) {
        let mut parent = path.parent();
        while let Some(folder) = parent {
            parent = folder.parent();
            self.nodes
                .entry(folder)
                .or_insert(Node::Folder { sync: None });
        }
    }

    fn file_node(&self, path: &ResourcePath) -> Result<&Node, WorkspaceError> {
        match self.nodes.get(path) {
            Some(node @ Node::File { .. }) => Ok(node),
            Some(Node::Folder { .. }) => Err(WorkspaceError::NotAFile(path.to_string())),
            None => Err(WorkspaceError::NotFound(path.to_string())),
        }
    }

    fn require_parent_folder(&self, path: &ResourcePath) -> Result<(), WorkspaceError> {
        let parent = path.parent().unwrap_or_default();
        match self.nodes.get(&parent) {
            Some(Node::Folder { .. }) => Ok(()),
            Some(Node::File { .. }) => Err(WorkspaceError::NotAFolder(parent.to_string())),
            None => Err(WorkspaceError::NotFound(parent.to_string())),
        }
    }
}

impl Workspace for MemoryWorkspace {
    fn exists(&self, path: &ResourcePath) -> bool {
        self.nodes.contains_key(path)
    }

    fn is_folder(&self, path: &ResourcePath) -> bool {
        matches!(self.nodes.get(path), Some(Node::Folder { .. }))
    }

    /// Members include managed files that were deleted locally.
    fn members(&self, folder: &ResourcePath) -> Result<Vec<ResourceHandle>, WorkspaceError> {
        if !self.is_folder(folder) {
            return Err(WorkspaceError::NotAFolder(folder.to_string()));
        }
        let is_member = |path: &ResourcePath| !path.is_root() && path.parent().as_ref() == Some(folder);

        let mut members: BTreeMap<&ResourcePath, ResourceHandle> = self
            .nodes
            .iter()
            .filter(|(path, _)| is_member(*path))
            .map(|(path, node)| {
                let handle = match node {
                    Node::Folder { .. } => ResourceHandle::folder(path.clone()),
                    Node::File { .. } => ResourceHandle::file(path.clone()),
                };
                (path, handle)
            })
            .collect();
        for path in self.entries.keys().filter(|path| is_member(*path)) {
            members
                .entry(path)
                .or_insert_with(|| ResourceHandle::file(path.clone()));
        }
        Ok(members.into_values().collect())
    }

    fn folder_sync(&self, path: &ResourcePath) -> Option<FolderSyncInfo> {
        match self.nodes.get(path) {
            Some(Node::Folder { sync }) => sync.clone(),
            _ => None,
        }
    }

    fn set_folder_sync(
        &mut self,
        path: &ResourcePath,
        info: FolderSyncInfo,
    ) -> Result<(), WorkspaceError> {
        if let Some(Node::File { .. }) = self.nodes.get(path) {
            return Err(WorkspaceError::NotAFolder(path.to_string()));
        }
        self.ensure_parents(path);
        self.nodes
            .insert(path.clone(), Node::Folder { sync: Some(info) });
        Ok(())
    }

    fn entry(&self, path: &ResourcePath) -> Option<ResourceSyncInfo> {
        self.entries.get(path).cloned()
    }

    fn set_entry(&mut self, path: &ResourcePath, info: ResourceSyncInfo) -> Result<(), WorkspaceError> {
        self.require_parent_folder(path)?;
        if self.is_folder(path) {
            return Err(WorkspaceError::NotAFile(path.to_string()));
        }
        self.entries.insert(path.clone(), info);
        Ok(())
    }

    fn remove_entry(&mut self, path: &ResourcePath) -> Result<(), WorkspaceError> {
        self.entries.remove(path);
        Ok(())
    }

    fn modification_time(&self, path: &ResourcePath) -> Option<DateTime<Utc>> {
        match self.nodes.get(path) {
            Some(Node::File { modified, .. }) => Some(*modified),
            _ => None,
        }
    }

    fn is_modified(&self, path: &ResourcePath) -> bool {
        match (self.nodes.get(path), self.entries.get(path)) {
            (Some(Node::File { modified, .. }), Some(entry)) => {
                entry.timestamp != format_entry_timestamp(modified)
            }
            _ => false,
        }
    }

    fn read_file(&self, path: &ResourcePath) -> Result<Vec<u8>, WorkspaceError> {
        match self.file_node(path)? {
            Node::File { contents, .. } => Ok(contents.clone()),
            Node::Folder { .. } => Err(WorkspaceError::NotAFile(path.to_string())),
        }
    }

    fn write_file(
        &mut self,
        path: &ResourcePath,
        contents: &[u8],
        modified: Option<DateTime<Utc>>,
    ) -> Result<(), WorkspaceError> {
        self.require_parent_folder(path)?;
        if self.is_folder(path) {
            return Err(WorkspaceError::NotAFile(path.to_string()));
        }
        let time = match modified {
            Some(time) => time,
            None => self.tick(),
        };
        self.nodes.insert(
            path.clone(),
            Node::File {
                contents: contents.to_vec(),
                modified: time,
            },
        );
        Ok(())
    }

    fn delete_file(&mut self, path: &ResourcePath) -> Result<(), WorkspaceError> {
        match self.nodes.get(path) {
            Some(Node::File { .. }) => {
                self.nodes.remove(path);
                Ok(())
            }
            Some(Node::Folder { .. }) => Err(WorkspaceError::NotAFile(path.to_string())),
            None => Ok(()),
        }
    }

    fn copy_file(&mut self, path: &ResourcePath, new_name: &str) -> Result<(), WorkspaceError> {
        let contents = self.read_file(path)?;
        let folder = path.parent().unwrap_or_default();
        let target = folder.join(new_name)?;
        let modified = self.modification_time(path);
        self.write_file(&target, &contents, modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(path: &str) -> ResourcePath {
        ResourcePath::new(path).unwrap()
    }

    fn workspace() -> MemoryWorkspace {
        MemoryWorkspace::new()
            .with_root_sync(FolderSyncInfo::new("module", "/cvsroot"))
            .with_folder("src", Some(FolderSyncInfo::new("module/src", "/cvsroot")))
            .with_managed_file("src/a.c", b"int a;", "1.1")
            .with_file("notes.txt", b"todo")
            .with_folder("build", None)
    }

    #[test]
    fn managed_resolution() {
        let ws = workspace();
        assert!(ws.child(&p("src")).unwrap().is_folder());
        assert!(!ws.child(&p("src/a.c")).unwrap().is_folder());
        assert!(matches!(
            ws.child(&p("notes.txt")),
            Err(WorkspaceError::NotFound(_))
        ));
        assert!(ws.child(&p("build")).is_err());
        assert!(ws.plain(&p("build")).is_folder());
        assert!(!ws.plain(&p("missing.txt")).is_folder());
    }

    #[test]
    fn members_are_immediate_and_sorted() {
        let ws = workspace();
        let names: Vec<String> = ws
            .members(&ResourcePath::root())
            .unwrap()
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(names, vec!["build", "notes.txt", "src"]);
        assert!(ws.members(&p("notes.txt")).is_err());
    }

    #[test]
    fn modification_tracking() {
        let mut ws = workspace();
        assert!(!ws.is_modified(&p("src/a.c")));
        ws.edit_file("src/a.c", b"int b;");
        assert!(ws.is_modified(&p("src/a.c")));
        assert!(!ws.is_modified(&p("notes.txt")));
    }

    #[test]
    fn write_requires_parent_folder() {
        let mut ws = workspace();
        assert!(ws.write_file(&p("nowhere/a.c"), b"", None).is_err());
        ws.write_file(&p("src/b.c"), b"x", None).unwrap();
        assert_eq!(ws.read_file(&p("src/b.c")).unwrap(), b"x".to_vec());
    }

    #[test]
    fn explicit_modification_time_is_kept() {
        let mut ws = workspace();
        let time = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
        ws.write_file(&p("src/a.c"), b"y", Some(time)).unwrap();
        assert_eq!(ws.modification_time(&p("src/a.c")), Some(time));
    }

    #[test]
    fn copy_and_delete() {
        let mut ws = workspace();
        ws.copy_file(&p("src/a.c"), ".#a.c.1.1").unwrap();
        assert_eq!(ws.read_file(&p("src/.#a.c.1.1")).unwrap(), b"int a;".to_vec());
        assert!(ws.entry(&p("src/.#a.c.1.1")).is_none());

        ws.delete_file(&p("src/a.c")).unwrap();
        assert!(!ws.exists(&p("src/a.c")));
        ws.delete_file(&p("src/a.c")).unwrap();
    }

    #[test]
    fn deleted_managed_file_keeps_entry() {
        let mut ws = workspace();
        ws.delete_file(&p("src/a.c")).unwrap();
        assert_eq!(ws.entry(&p("src/a.c")).unwrap().revision, "1.1");
        assert!(!ws.is_modified(&p("src/a.c")));

        let members = ws.members(&p("src")).unwrap();
        assert_eq!(members, vec![ResourceHandle::file(p("src/a.c"))]);
        assert!(ws.child(&p("src/a.c")).is_ok());
    }

    #[test]
    fn folder_sync_creates_folders() {
        let mut ws = workspace();
        ws.set_folder_sync(&p("lib/util"), FolderSyncInfo::new("module/lib/util", "/cvsroot"))
            .unwrap();
        assert!(ws.is_folder(&p("lib")));
        assert!(!ws.is_managed_folder(&p("lib")));
        assert!(ws.is_managed_folder(&p("lib/util")));
        assert!(ws.set_folder_sync(&p("notes.txt"), FolderSyncInfo::new("x", "/cvsroot")).is_err());
    }

    #[test]
    fn entries() {
        let mut ws = workspace();
        ws.set_entry(&p("notes.txt"), ResourceSyncInfo::new("notes.txt", "0"))
            .unwrap();
        assert!(ws.entry(&p("notes.txt")).unwrap().is_added());
        ws.remove_entry(&p("notes.txt")).unwrap();
        assert!(ws.entry(&p("notes.txt")).is_none());
        assert!(ws.exists(&p("notes.txt")));
    }
}
