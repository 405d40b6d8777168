//! commands::checkout
//!
//! Creates working copies of modules. The arguments name modules, not
//! local paths, so the only work resource is the root and nothing local is
//! described; the server answers with `Updated` for every file.

use crate::engine::command::{Command, Request};
use crate::engine::options::LocalOption;
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;
use crate::workspace::ResourceHandle;

/// Check out into a directory of this name instead of the module name.
pub fn make_directory_option(name: impl Into<String>) -> LocalOption {
    LocalOption::with_argument("-d", name)
}

/// Do not shorten module paths.
pub const DO_NOT_SHORTEN: LocalOption = LocalOption::new("-N");
/// Print the module database instead of checking out.
pub const LIST_MODULES: LocalOption = LocalOption::new("-c");

#[derive(Debug, Clone, Copy, Default)]
pub struct Checkout;

pub static CHECKOUT: Checkout = Checkout;

impl Command for Checkout {
    fn command_id(&self) -> &'static str {
        "co"
    }

    fn compute_work_resources(
        &self,
        session: &Session,
        _request: &Request,
    ) -> Result<Vec<ResourceHandle>, CommandError> {
        Ok(vec![session.local_root()])
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
}
