//! commands::add
//!
//! Schedules new files and folders for addition.
//!
//! Every resource must sit in a managed parent. The parent is declared with
//! `Directory` and each file is reported as modified, which is all the
//! server needs to create an added entry. A folder is declared as a
//! directory of its own, its repository derived from the parent's.

use crate::core::types::ResourcePath;
use crate::engine::command::{Command, Request};
use crate::engine::progress::ProgressMonitor;
use crate::engine::{check_cancelled, CommandError};
use crate::session::Session;
use crate::workspace::ResourceHandle;

#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

pub static ADD: Add = Add;

impl Command for Add {
    fn command_id(&self) -> &'static str {
        "add"
    }

    fn send_local_resource_state(
        &self,
        session: &mut Session,
        _request: &Request,
        resources: &[ResourceHandle],
        monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        for resource in resources {
            check_parent_managed(session, resource)?;
        }

        monitor.begin_task("sending new resources", resources.len() as u32);
        let mut current: Option<ResourcePath> = None;
        for resource in resources {
            check_cancelled(monitor)?;
            let parent = resource.path().parent().unwrap_or_default();
            let repository = declare(session, &mut current, &parent)?;

            if resource.is_folder() {
                let folder_repository = format!("{}/{}", repository, resource.name());
                session.send_directory(resource.path(), &folder_repository)?;
                current = Some(resource.path().clone());
            } else if session.is_valid_request("Is-modified") {
                session.send_is_modified(resource.name())?;
            } else {
                let contents = session.workspace().read_file(resource.path())?;
                session.send_modified(resource.name(), &contents)?;
            }
            monitor.worked(1);
        }
        monitor.done();
        Ok(())
    }
}

fn check_parent_managed(session: &Session, resource: &ResourceHandle) -> Result<(), CommandError> {
    let managed = resource
        .path()
        .parent()
        .is_some_and(|parent| session.workspace().is_managed_folder(&parent));
    if managed {
        Ok(())
    } else {
        Err(CommandError::NotManaged(resource.path().to_string()))
    }
}

/// Declare `folder` unless it is already current; returns its repository.
fn declare(
    session: &mut Session,
    current: &mut Option<ResourcePath>,
    folder: &ResourcePath,
) -> Result<String, CommandError> {
    let info = session
        .workspace()
        .folder_sync(folder)
        .ok_or_else(|| CommandError::NotManaged(folder.to_string()))?;
    if current.as_ref() != Some(folder) {
        session.send_directory(folder, &info.repository)?;
        *current = Some(folder.clone());
    }
    Ok(info.repository)
}
