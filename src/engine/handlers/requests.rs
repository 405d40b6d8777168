//! engine::handlers::requests
//!
//! `Valid-requests <list>`: the requests the server accepts.

use super::ResponseHandler;
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;

/// Records the server's request list in the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidRequestsHandler;

impl ResponseHandler for ValidRequestsHandler {
    fn keyword(&self) -> &'static str {
        "Valid-requests"
    }

    fn handle(
        &self,
        session: &mut Session,
        argument: &str,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        session.set_valid_requests(argument.split_whitespace());
        Ok(())
    }
}
