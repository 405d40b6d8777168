//! commands::diff

use super::send_structure;
use crate::engine::command::{Command, Request};
use crate::engine::options::LocalOption;
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;
use crate::workspace::ResourceHandle;

/// Unified diff output.
pub const UNIFIED_FORMAT: LocalOption = LocalOption::new("-u");
/// Context diff output.
pub const CONTEXT_FORMAT: LocalOption = LocalOption::new("-c");
/// Report new and removed files as diffs against an empty file.
pub const INCLUDE_NEWFILES: LocalOption = LocalOption::new("-N");

/// Compares working files with repository revisions.
///
/// Differences are reported through `M` lines; the server answers `error`
/// when any file differs, so a diff with output is a server error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diff;

pub static DIFF: Diff = Diff;

impl Command for Diff {
    fn command_id(&self) -> &'static str {
        "diff"
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

    #[test]
    fn differences_end_in_server_error() {
        let (mut session, connection) = fixtures::session(
            fixtures::workspace(),
            &["M Index: dirty.c", "M -dirty", "M +dirty, edited", "error "],
        );
        let request = Request::new().local(UNIFIED_FORMAT).argument("dirty.c");
        let status = DIFF
            .execute(&mut session, &fixtures::context(), &request, None, None)
            .unwrap();

        assert!(status.is_server_error());
        assert!(status.entries().is_empty());
        let lines = connection.sent_lines();
        assert_eq!(lines[0], "Argument -u");
        assert!(lines.contains(&"Modified dirty.c".to_string()));
        assert!(!lines.contains(&"Unchanged clean.c".to_string()));
    }
}
