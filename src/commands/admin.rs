//! commands::admin
//!
//! Repository administration (`cvs admin`), e.g. `-kb` to change a file's
//! default keyword mode or `-o` to outdate revisions. The options are
//! passed through untouched; locally the command only describes the tree.

use super::send_structure;
use crate::engine::command::{Command, Request};
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;
use crate::workspace::ResourceHandle;

#[derive(Debug, Clone, Copy, Default)]
pub struct Admin;

pub static ADMIN: Admin = Admin;

impl Command for Admin {
    fn command_id(&self) -> &'static str {
        "admin"
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
    use crate::engine::options::KSUBST_BINARY;

    #[test]
    fn options_precede_structure() {
        let (mut session, connection) = fixtures::session(fixtures::workspace(), &["ok"]);
        let request = Request::new().local(KSUBST_BINARY).argument("clean.c");
        ADMIN
            .execute(&mut session, &fixtures::context(), &request, None, None)
            .unwrap();

        let lines = connection.sent_lines();
        assert_eq!(lines[0], "Argument -kb");
        assert_eq!(lines[1], "Directory .");
        assert!(lines.contains(&"Unchanged clean.c".to_string()));
        assert_eq!(
            &lines[lines.len() - 2..],
            &["Argument clean.c".to_string(), "admin".to_string()]
        );
    }
}
