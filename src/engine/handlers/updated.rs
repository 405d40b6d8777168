//! engine::handlers::updated
//!
//! `Updated` and `Merged`: new contents for a file.
//!
//! The response is followed by the repository file, the entry line, the
//! file mode and a file transmission. The contents are written with the
//! modification time announced by a preceding `Mod-time`, if any. A merged
//! file records the merge marker as its timestamp so it reads as modified
//! until the user touches it.

use tracing::debug;

use super::{read_file_target, ResponseHandler};
use crate::core::metadata::{format_entry_timestamp, FolderSyncInfo, ResourceSyncInfo, MERGE_TIMESTAMP};
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateKind {
    Updated,
    Merged,
}

/// Writes file contents sent by the server.
#[derive(Debug, Clone, Copy)]
pub struct UpdatedHandler {
    kind: UpdateKind,
}

impl UpdatedHandler {
    /// The `Updated` handler.
    pub fn updated() -> Self {
        Self {
            kind: UpdateKind::Updated,
        }
    }

    /// The `Merged` handler.
    pub fn merged() -> Self {
        Self {
            kind: UpdateKind::Merged,
        }
    }
}

impl ResponseHandler for UpdatedHandler {
    fn keyword(&self) -> &'static str {
        match self.kind {
            UpdateKind::Updated => "Updated",
            UpdateKind::Merged => "Merged",
        }
    }

    fn handle(
        &self,
        session: &mut Session,
        argument: &str,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        let target = read_file_target(session, argument)?;
        let entry_line = session.read_line()?;
        let _mode = session.read_line()?;
        let contents = session.read_file_transmission()?;
        let mod_time = session.take_mod_time();
        if session.no_local_changes() {
            debug!(file = %target.file, "not writing update, no local changes");
            return Ok(());
        }

        let mut entry = ResourceSyncInfo::parse(&entry_line)?;

        if !session.workspace().is_managed_folder(&target.folder) {
            let info = FolderSyncInfo::new(target.repository.as_str(), session.repository_root());
            session.workspace_mut().set_folder_sync(&target.folder, info)?;
        }

        let workspace = session.workspace_mut();
        workspace.write_file(&target.file, &contents, mod_time)?;
        entry.timestamp = match self.kind {
            UpdateKind::Merged => MERGE_TIMESTAMP.to_string(),
            UpdateKind::Updated => workspace
                .modification_time(&target.file)
                .map(|time| format_entry_timestamp(&time))
                .unwrap_or_default(),
        };
        workspace.set_entry(&target.file, entry)?;
        Ok(())
    }
}
