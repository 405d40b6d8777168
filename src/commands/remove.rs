//! commands::remove

use super::send_structure;
use crate::engine::command::{check_resources_managed, Command, Request};
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;
use crate::workspace::ResourceHandle;

/// Schedules files for removal. The local files must already be deleted;
/// the server answers with entries marking them removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Remove;

pub static REMOVE: Remove = Remove;

impl Command for Remove {
    fn command_id(&self) -> &'static str {
        "remove"
    }

    fn send_local_resource_state(
        &self,
        session: &mut Session,
        request: &Request,
        resources: &[ResourceHandle],
        monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        check_resources_managed(session, resources)?;
        send_structure(session, request, resources, monitor, false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use crate::core::types::ResourcePath;

    #[test]
    fn deleted_file_sends_entry_only() {
        let mut workspace = fixtures::workspace();
        let clean = ResourcePath::new("clean.c").unwrap();
        crate::workspace::Workspace::delete_file(&mut workspace, &clean).unwrap();

        let (mut session, connection) = fixtures::session(
            workspace,
            &[
                "E cvs remove: scheduling `clean.c' for removal",
                "Checked-in ./",
                "/cvsroot/module/clean.c",
                "/clean.c/-1.1///",
                "ok",
            ],
        );
        let request = Request::new().argument("clean.c");
        let status = REMOVE
            .execute(&mut session, &fixtures::context(), &request, None, None)
            .unwrap();

        assert!(status.is_success());
        let lines = connection.sent_lines();
        let entry = lines.iter().position(|l| l.starts_with("Entry /clean.c/1.1/")).unwrap();
        assert_eq!(lines[entry + 1], "Directory .");
        assert!(session.workspace().entry(&clean).unwrap().is_deleted());
    }
}
