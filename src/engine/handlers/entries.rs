//! engine::handlers::entries
//!
//! Handlers that change the sync state of a single file.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{read_file_target, ResponseHandler};
use crate::core::metadata::{format_entry_timestamp, ResourceSyncInfo};
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;

/// `Checked-in <dir>`: the server accepted the file; store its new entry.
///
/// The entry's timestamp is set to the file's current modification time so
/// the file reads as unmodified.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckedInHandler;

impl ResponseHandler for CheckedInHandler {
    fn keyword(&self) -> &'static str {
        "Checked-in"
    }

    fn handle(
        &self,
        session: &mut Session,
        argument: &str,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        let target = read_file_target(session, argument)?;
        let entry_line = session.read_line()?;
        if session.no_local_changes() {
            return Ok(());
        }

        let mut entry = ResourceSyncInfo::parse(&entry_line)?;
        if let Some(modified) = session.workspace().modification_time(&target.file) {
            entry.timestamp = format_entry_timestamp(&modified);
        }
        session.workspace_mut().set_entry(&target.file, entry)?;
        Ok(())
    }
}

/// `Copy-file <dir>`: copy a local file to a new name in the same folder.
///
/// Used to keep the pre-merge contents of a file as `.#name.revision`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyFileHandler;

impl ResponseHandler for CopyFileHandler {
    fn keyword(&self) -> &'static str {
        "Copy-file"
    }

    fn handle(
        &self,
        session: &mut Session,
        argument: &str,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        let target = read_file_target(session, argument)?;
        let new_name = session.read_line()?;
        if session.no_local_changes() {
            return Ok(());
        }

        // The server may send the new name with the directory prefix.
        let new_name = new_name.rsplit('/').next().unwrap_or(&new_name);
        if !session.workspace().exists(&target.file) {
            debug!(file = %target.file, "copy source missing, skipping");
            return Ok(());
        }
        session.workspace_mut().copy_file(&target.file, new_name)?;
        Ok(())
    }
}

/// `Mod-time <date>`: modification time for the next file update.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModTimeHandler;

impl ResponseHandler for ModTimeHandler {
    fn keyword(&self) -> &'static str {
        "Mod-time"
    }

    fn handle(
        &self,
        session: &mut Session,
        argument: &str,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        let time = DateTime::parse_from_rfc2822(argument.trim()).map_err(|e| {
            CommandError::MalformedResponse(format!("bad modification time '{}': {}", argument, e))
        })?;
        session.set_mod_time(Some(time.with_timezone(&Utc)));
        Ok(())
    }
}

/// `Removed <dir>`: the file is gone from the repository; delete it and its entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemovedHandler;

impl ResponseHandler for RemovedHandler {
    fn keyword(&self) -> &'static str {
        "Removed"
    }

    fn handle(
        &self,
        session: &mut Session,
        argument: &str,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        let target = read_file_target(session, argument)?;
        if session.no_local_changes() {
            return Ok(());
        }
        let workspace = session.workspace_mut();
        workspace.delete_file(&target.file)?;
        workspace.remove_entry(&target.file)?;
        Ok(())
    }
}

/// `Remove-entry <dir>`: forget the file's entry, keeping the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveEntryHandler;

impl ResponseHandler for RemoveEntryHandler {
    fn keyword(&self) -> &'static str {
        "Remove-entry"
    }

    fn handle(
        &self,
        session: &mut Session,
        argument: &str,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        let target = read_file_target(session, argument)?;
        if session.no_local_changes() {
            return Ok(());
        }
        session.workspace_mut().remove_entry(&target.file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::FolderSyncInfo;
    use crate::core::types::ResourcePath;
    use crate::engine::progress::NullMonitor;
    use crate::session::mock::MockConnection;
    use crate::workspace::memory::MemoryWorkspace;
    use crate::workspace::Workspace;
    use chrono::TimeZone;

    fn p(path: &str) -> ResourcePath {
        ResourcePath::new(path).unwrap()
    }

    fn workspace() -> MemoryWorkspace {
        MemoryWorkspace::new()
            .with_root_sync(FolderSyncInfo::new("module", "/cvsroot"))
            .with_managed_file("a.c", b"int a;", "1.1")
            .with_file("new.c", b"int n;")
    }

    fn session(connection: MockConnection) -> Session {
        Session::new(Box::new(connection), Box::new(workspace()), "/cvsroot")
    }

    mod checked_in {
        use super::*;

        #[test]
        fn stores_entry_as_unmodified() {
            let connection = MockConnection::new()
                .with_line("/cvsroot/module/new.c")
                .with_line("/new.c/1.1/dummy timestamp//");
            let mut session = session(connection.clone());
            CheckedInHandler.handle(&mut session, "./", &NullMonitor).unwrap();

            let entry = session.workspace().entry(&p("new.c")).unwrap();
            assert_eq!(entry.revision, "1.1");
            assert!(!session.workspace().is_modified(&p("new.c")));
            assert_eq!(connection.remaining(), 0);
        }

        #[test]
        fn consumes_input_without_local_changes() {
            let connection = MockConnection::new()
                .with_line("/cvsroot/module/new.c")
                .with_line("/new.c/1.1///")
                .with_line("ok");
            let mut session = session(connection.clone());
            session.set_no_local_changes(true);
            CheckedInHandler.handle(&mut session, "./", &NullMonitor).unwrap();

            assert!(session.workspace().entry(&p("new.c")).is_none());
            assert_eq!(session.read_line().unwrap(), "ok");
        }

        #[test]
        fn malformed_entry() {
            let connection = MockConnection::new()
                .with_line("/cvsroot/module/new.c")
                .with_line("garbage");
            let mut session = session(connection);
            assert!(matches!(
                CheckedInHandler.handle(&mut session, "./", &NullMonitor),
                Err(CommandError::Sync(_))
            ));
        }
    }

    #[test]
    fn copy_file_keeps_backup() {
        let connection = MockConnection::new()
            .with_line("/cvsroot/module/a.c")
            .with_line(".#a.c.1.1");
        let mut session = session(connection);
        CopyFileHandler.handle(&mut session, "./", &NullMonitor).unwrap();
        assert_eq!(
            session.workspace().read_file(&p(".#a.c.1.1")).unwrap(),
            b"int a;".to_vec()
        );
    }

    #[test]
    fn mod_time_is_remembered() {
        let mut session = session(MockConnection::new());
        ModTimeHandler
            .handle(&mut session, "14 Jan 2002 10:00:00 -0000", &NullMonitor)
            .unwrap();
        assert_eq!(
            session.mod_time(),
            Some(Utc.with_ymd_and_hms(2002, 1, 14, 10, 0, 0).unwrap())
        );

        assert!(matches!(
            ModTimeHandler.handle(&mut session, "yesterday", &NullMonitor),
            Err(CommandError::MalformedResponse(_))
        ));
    }

    #[test]
    fn removed_deletes_file_and_entry() {
        let connection = MockConnection::new().with_line("/cvsroot/module/a.c");
        let mut session = session(connection);
        RemovedHandler.handle(&mut session, "./", &NullMonitor).unwrap();
        assert!(!session.workspace().exists(&p("a.c")));
        assert!(session.workspace().entry(&p("a.c")).is_none());
    }

    #[test]
    fn remove_entry_keeps_file() {
        let connection = MockConnection::new().with_line("/cvsroot/module/a.c");
        let mut session = session(connection);
        RemoveEntryHandler.handle(&mut session, "./", &NullMonitor).unwrap();
        assert!(session.workspace().exists(&p("a.c")));
        assert!(session.workspace().entry(&p("a.c")).is_none());
    }
}
