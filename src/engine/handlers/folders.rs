//! engine::handlers::folders
//!
//! Handlers for folder-level flags: sticky tags and static directories.
//!
//! Both responses name a local folder and its repository directory. A folder
//! that is not yet managed is put under version control using that
//! repository directory, since the server announces flags of new folders
//! before their first file arrives.

use super::{local_dir, read_folder_repository, ResponseHandler};
use crate::core::metadata::FolderSyncInfo;
use crate::core::types::{ResourcePath, Tag};
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;

fn folder_sync_or_new(session: &Session, folder: &ResourcePath, repository: &str) -> FolderSyncInfo {
    session
        .workspace()
        .folder_sync(folder)
        .unwrap_or_else(|| FolderSyncInfo::new(repository, session.repository_root()))
}

/// `Set-static-directory` and `Clear-static-directory`.
#[derive(Debug, Clone, Copy)]
pub struct StaticDirectoryHandler {
    set: bool,
}

impl StaticDirectoryHandler {
    pub fn set() -> Self {
        Self { set: true }
    }

    pub fn clear() -> Self {
        Self { set: false }
    }
}

impl ResponseHandler for StaticDirectoryHandler {
    fn keyword(&self) -> &'static str {
        if self.set {
            "Set-static-directory"
        } else {
            "Clear-static-directory"
        }
    }

    fn handle(
        &self,
        session: &mut Session,
        argument: &str,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        let folder = local_dir(argument)?;
        let repository = read_folder_repository(session)?;
        if session.no_local_changes() {
            return Ok(());
        }
        let info = folder_sync_or_new(session, &folder, &repository).with_static(self.set);
        session.workspace_mut().set_folder_sync(&folder, info)?;
        Ok(())
    }
}

/// `Set-sticky` and `Clear-sticky`.
///
/// `Set-sticky` is followed by a tagspec line after the repository line.
#[derive(Debug, Clone, Copy)]
pub struct StickyHandler {
    set: bool,
}

impl StickyHandler {
    pub fn set() -> Self {
        Self { set: true }
    }

    pub fn clear() -> Self {
        Self { set: false }
    }
}

impl ResponseHandler for StickyHandler {
    fn keyword(&self) -> &'static str {
        if self.set {
            "Set-sticky"
        } else {
            "Clear-sticky"
        }
    }

    fn handle(
        &self,
        session: &mut Session,
        argument: &str,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        let folder = local_dir(argument)?;
        let repository = read_folder_repository(session)?;
        let tag = if self.set {
            let tagspec = session.read_line()?;
            let tag = Tag::from_tagspec(&tagspec).map_err(|e| {
                CommandError::MalformedResponse(format!("bad sticky tag: {}", e))
            })?;
            Some(tag)
        } else {
            None
        };
        if session.no_local_changes() {
            return Ok(());
        }

        let mut info = folder_sync_or_new(session, &folder, &repository);
        info.tag = tag;
        session.workspace_mut().set_folder_sync(&folder, info)?;
        Ok(())
    }
}
