//! commands::status

use super::send_structure;
use crate::engine::command::{Command, Request};
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;
use crate::workspace::ResourceHandle;

/// Reports the state of files relative to the repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct Status;

pub static STATUS: Status = Status;

impl Command for Status {
    fn command_id(&self) -> &'static str {
        "status"
    }

    fn send_local_resource_state(
        &self,
        session: &mut Session,
        request: &Request,
        resources: &[ResourceHandle],
        monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        send_structure(session, request, resources, monitor, false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use crate::core::status::Severity;

    #[test]
    fn describes_tree_then_runs_status() {
        let (mut session, connection) = fixtures::session(
            fixtures::workspace(),
            &["M File: clean.c  Status: Up-to-date", "ok"],
        );
        let status = STATUS
            .execute(&mut session, &fixtures::context(), &Request::new(), None, None)
            .unwrap();

        assert!(status.is_ok());
        let lines = connection.sent_lines();
        assert!(lines.contains(&"Unchanged clean.c".to_string()));
        assert!(lines.contains(&"Modified dirty.c".to_string()));
        assert!(lines.contains(&"Questionable new.c".to_string()));
        assert!(lines.contains(&"Unchanged a.c".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("status"));
    }

    #[test]
    fn error_lines_become_warnings() {
        let (mut session, _) = fixtures::session(
            fixtures::workspace(),
            &["E cvs status: nothing known about new.c", "ok"],
        );
        let status = STATUS
            .execute(&mut session, &fixtures::context(), &Request::new(), None, None)
            .unwrap();

        assert!(status.is_success());
        assert_eq!(status.entries()[0].severity, Severity::Error);
    }
}
