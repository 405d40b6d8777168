//! engine::visitor
//!
//! Transmits the local state of a resource tree.
//!
//! # Design
//!
//! The visitor walks the given resources depth-first and describes them in
//! request order:
//!
//! ```text
//! Directory <local>        managed folder (lazily, before its first file)
//! <repository>
//! Static-directory         if the folder is static
//! Sticky <tagspec>         if the folder has a sticky tag
//! Entry /name/rev/...      managed file
//! Modified name | Unchanged name
//! Questionable name        unmanaged file or folder in a managed folder
//! ```
//!
//! `Entry` and `Modified` lines apply to the most recently declared
//! directory, so a folder is declared again whenever the walk returns to it.

use tracing::trace;

use super::progress::ProgressMonitor;
use super::{check_cancelled, CommandError};
use crate::core::types::ResourcePath;
use crate::session::Session;
use crate::workspace::ResourceHandle;

/// Sends `Directory`/`Entry`/`Modified`/`Unchanged`/`Questionable` requests.
pub struct FileStructureVisitor<'s> {
    session: &'s mut Session,
    modified_only: bool,
    send_empty_folders: bool,
    recurse: bool,
    current: Option<ResourcePath>,
}

impl<'s> FileStructureVisitor<'s> {
    /// A visitor that sends every resource and recurses into folders.
    pub fn new(session: &'s mut Session) -> Self {
        Self {
            session,
            modified_only: false,
            send_empty_folders: false,
            recurse: true,
            current: None,
        }
    }

    /// Builder: skip clean files and unmanaged resources.
    pub fn modified_only(mut self, modified_only: bool) -> Self {
        self.modified_only = modified_only;
        self
    }

    /// Builder: declare every managed folder, even with nothing to send in it.
    pub fn send_empty_folders(mut self, send_empty_folders: bool) -> Self {
        self.send_empty_folders = send_empty_folders;
        self
    }

    /// Builder: whether to descend into subfolders of folder resources.
    pub fn recurse(mut self, recurse: bool) -> Self {
        self.recurse = recurse;
        self
    }

    /// Describe `resources` to the server.
    pub fn visit(
        mut self,
        resources: &[ResourceHandle],
        monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        monitor.begin_task("sending local state", resources.len() as u32);
        for resource in resources {
            check_cancelled(monitor)?;
            if resource.is_folder() {
                self.visit_folder(resource.path(), true)?;
            } else {
                self.visit_file(resource.path())?;
            }
            monitor.worked(1);
        }
        monitor.done();
        Ok(())
    }

    fn visit_folder(&mut self, path: &ResourcePath, top_level: bool) -> Result<(), CommandError> {
        let workspace = self.session.workspace();
        if !workspace.is_managed_folder(path) {
            if !self.modified_only && !path.is_root() {
                self.send_questionable(path)?;
            }
            return Ok(());
        }

        if self.send_empty_folders {
            self.declare_folder(path)?;
        }

        let members = self.session.workspace().members(path)?;
        for member in members {
            if member.is_folder() {
                if self.recurse || !top_level {
                    self.visit_folder(member.path(), false)?;
                } else if !self.modified_only
                    && !self.session.workspace().is_managed_folder(member.path())
                {
                    self.send_questionable(member.path())?;
                }
            } else {
                self.visit_file(member.path())?;
            }
        }
        Ok(())
    }

    fn visit_file(&mut self, path: &ResourcePath) -> Result<(), CommandError> {
        let workspace = self.session.workspace();
        let Some(entry) = workspace.entry(path) else {
            if !self.modified_only && workspace.exists(path) {
                self.send_questionable(path)?;
            }
            return Ok(());
        };

        let exists = workspace.exists(path);
        let deleted = entry.is_deleted();
        let modified = exists && (entry.is_added() || workspace.is_modified(path));
        if self.modified_only && !modified && !deleted {
            return Ok(());
        }

        let folder = path.parent().unwrap_or_default();
        self.declare_folder(&folder)?;
        trace!(file = %path, modified, deleted, "sending entry");
        self.session.send_entry(&entry.to_entry_line())?;
        if deleted || !exists {
            return Ok(());
        }
        if modified {
            let contents = self.session.workspace().read_file(path)?;
            self.session.send_modified(path.name(), &contents)?;
        } else {
            self.session.send_unchanged(path.name())?;
        }
        Ok(())
    }

    /// Questionable resources are reported in their managed parent only.
    fn send_questionable(&mut self, path: &ResourcePath) -> Result<(), CommandError> {
        let folder = path.parent().unwrap_or_default();
        if !self.session.workspace().is_managed_folder(&folder) {
            return Ok(());
        }
        self.declare_folder(&folder)?;
        self.session.send_questionable(path.name())?;
        Ok(())
    }

    fn declare_folder(&mut self, path: &ResourcePath) -> Result<(), CommandError> {
        if self.current.as_ref() == Some(path) {
            return Ok(());
        }
        let info = self
            .session
            .workspace()
            .folder_sync(path)
            .ok_or_else(|| CommandError::NotManaged(path.to_string()))?;

        self.session.send_directory(path, &info.repository)?;
        if info.is_static && self.session.is_valid_request("Static-directory") {
            self.session.send_static_directory()?;
        }
        if let Some(tagspec) = info.tag.as_ref().and_then(|tag| tag.to_tagspec()) {
            if self.session.is_valid_request("Sticky") {
                self.session.send_sticky(&tagspec)?;
            }
        }
        self.current = Some(path.clone());
        Ok(())
    }
}
