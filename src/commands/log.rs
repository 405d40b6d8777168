//! commands::log

use super::send_structure;
use crate::engine::command::{Command, Request};
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;
use crate::workspace::ResourceHandle;

/// Prints revision history. The history arrives as `M` lines for the
/// caller's listener.
#[derive(Debug, Clone, Copy, Default)]
pub struct Log;

pub static LOG: Log = Log;

impl Command for Log {
    fn command_id(&self) -> &'static str {
        "log"
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
