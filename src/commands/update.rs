//! commands::update
//!
//! Brings the working tree up to date with the repository.
//!
//! Every managed folder is declared, including empty ones, so the server
//! can report folders that were added or pruned. After a successful run
//! with [`CLEAR_STICKY`], the sticky tags of the updated folders are
//! cleared locally to match what the server did to the files.

use tracing::debug;

use super::send_structure;
use crate::core::types::ResourcePath;
use crate::engine::command::{Command, Request};
use crate::engine::options::{CommandOption, LocalOption, DO_NOT_RECURSE};
use crate::engine::progress::ProgressMonitor;
use crate::engine::CommandError;
use crate::session::Session;
use crate::workspace::ResourceHandle;

/// Reset sticky tags, dates and keyword modes.
pub const CLEAR_STICKY: LocalOption = LocalOption::new("-A");
/// Create directories that exist in the repository but not locally.
pub const BUILD_DIRECTORIES: LocalOption = LocalOption::new("-d");
/// Overwrite locally modified files with clean repository copies.
pub const IGNORE_LOCAL_CHANGES: LocalOption = LocalOption::new("-C");

#[derive(Debug, Clone, Copy, Default)]
pub struct Update;

pub static UPDATE: Update = Update;

impl Command for Update {
    fn command_id(&self) -> &'static str {
        "update"
    }

    fn send_local_resource_state(
        &self,
        session: &mut Session,
        request: &Request,
        resources: &[ResourceHandle],
        monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        send_structure(session, request, resources, monitor, false, true)
    }

    fn command_finished(
        &self,
        session: &mut Session,
        request: &Request,
        resources: &[ResourceHandle],
        server_error: bool,
        monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        if server_error
            || session.no_local_changes()
            || !CLEAR_STICKY.is_element_of(&request.local_options)
        {
            return Ok(());
        }

        let recurse = !DO_NOT_RECURSE.is_element_of(&request.local_options);
        monitor.begin_task("clearing sticky tags", resources.len() as u32);
        for resource in resources.iter().filter(|r| r.is_folder() && r.is_local()) {
            clear_sticky(session, resource.path(), recurse)?;
            monitor.worked(1);
        }
        monitor.done();
        Ok(())
    }
}

fn clear_sticky(session: &mut Session, folder: &ResourcePath, recurse: bool) -> Result<(), CommandError> {
    let Some(info) = session.workspace().folder_sync(folder) else {
        return Ok(());
    };
    if info.tag.is_some() || info.is_static {
        debug!(folder = %folder, "clearing sticky tag");
        let mut cleared = info;
        cleared.tag = None;
        cleared.is_static = false;
        session.workspace_mut().set_folder_sync(folder, cleared)?;
    }

    if recurse {
        let members = session.workspace().members(folder)?;
        for member in members.iter().filter(|m| m.is_folder()) {
            clear_sticky(session, member.path(), true)?;
        }
    }
    Ok(())
}
