//! commands::commit
//!
//! Sends only what changed: modified, added and removed files. Clean files
//! and unmanaged resources are left out of the request entirely.

use super::send_structure;
use crate::engine::command::{check_resources_managed, Command, Request};
use crate::engine::options::LocalOption;
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;
use crate::workspace::ResourceHandle;

/// Force a new revision even if nothing changed.
pub const FORCE: LocalOption = LocalOption::new("-f");

#[derive(Debug, Clone, Copy, Default)]
pub struct Commit;

pub static COMMIT: Commit = Commit;

impl Command for Commit {
    fn command_id(&self) -> &'static str {
        "ci"
    }

    fn send_local_resource_state(
        &self,
        session: &mut Session,
        request: &Request,
        resources: &[ResourceHandle],
        monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        check_resources_managed(session, resources)?;
        send_structure(session, request, resources, monitor, true, false)
    }
}
