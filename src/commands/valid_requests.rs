//! commands::valid_requests
//!
//! Asks the server which requests it accepts.
//!
//! The answer arrives as a `Valid-requests` response, which the standard
//! handler records in the session. Nothing local is described and no
//! working directory is declared.

use crate::engine::command::{Command, Request};
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;
use crate::workspace::ResourceHandle;

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidRequests;

pub static VALID_REQUESTS: ValidRequests = ValidRequests;

impl Command for ValidRequests {
    fn command_id(&self) -> &'static str {
        "valid-requests"
    }

    fn compute_work_resources(
        &self,
        _session: &Session,
        _request: &Request,
    ) -> Result<Vec<ResourceHandle>, CommandError> {
        Ok(Vec::new())
    }

    fn send_local_resource_state(
        &self,
        _session: &mut Session,
        _request: &Request,
        _resources: &[ResourceHandle],
        _monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        Ok(())
    }

    fn send_local_working_directory(&self, _session: &mut Session) -> Result<(), CommandError> {
        Ok(())
    }

    fn send_arguments(&self, _session: &mut Session, _request: &Request) -> Result<(), CommandError> {
        Ok(())
    }
}
