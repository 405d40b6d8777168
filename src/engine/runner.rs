//! engine::runner
//!
//! The single entry point for command execution.
//!
//! # Architecture
//!
//! [`run_command`] is the fixed lifecycle every [`Command`] goes through:
//!
//! ```text
//! Resolve -> Reload -> Send options -> Send local state -> Send working dir
//!     -> Send arguments -> Send command -> Dispatch responses -> Finish -> Save
//! ```
//!
//! Progress is allocated out of [`TOTAL_WORK`] units:
//!
//! | phase | units |
//! |---|---|
//! | resolve and reload | 10 |
//! | local state | 10 |
//! | responses | 70 |
//! | finish | 5 |
//! | save | 5 |
//!
//! # Invariants
//!
//! - Reload completes before the first request byte is written
//! - Save runs exactly once, after everything else, on every exit path
//! - Cancellation is checked after reload, after the local state is sent,
//!   and before every response line
//! - A fault before or during dispatch wins over a save fault; the save
//!   fault is logged

use tracing::{debug, warn};

use super::command::{Command, Request};
use super::dispatch::process_responses;
use super::listener::OutputListener;
use super::options::{CommandOption, DO_NOT_CHANGE};
use super::progress::{NullMonitor, ProgressMonitor, SubMonitor};
use super::{check_cancelled, CommandError, CommandResult, Context};
use crate::core::status::CommandStatus;
use crate::session::Session;
use crate::workspace::ResourceHandle;

/// Units of the whole invocation.
pub const TOTAL_WORK: u32 = 100;
const RESOLVE_WORK: u32 = 10;
const LOCAL_STATE_WORK: u32 = 10;
const RESPONSE_WORK: u32 = 70;
const FINISH_WORK: u32 = 5;
const SAVE_WORK: u32 = 5;

/// Run a command through the full lifecycle.
///
/// # Returns
///
/// The aggregate status of the response stream. A server `error` is
/// `Ok(CommandStatus::ServerError { .. })`.
///
/// # Errors
///
/// Any local or protocol fault, cancellation, or a failure to save sync
/// metadata.
pub fn run_command<C: Command + ?Sized>(
    command: &C,
    session: &mut Session,
    ctx: &Context,
    request: &Request,
    listener: Option<&dyn OutputListener>,
    monitor: Option<&dyn ProgressMonitor>,
) -> CommandResult {
    let monitor: &dyn ProgressMonitor = monitor.unwrap_or(&NullMonitor);
    let listener = listener.unwrap_or_else(|| command.default_listener());
    let id = command.command_id();
    monitor.begin_task(id, TOTAL_WORK);

    let mut resources = Vec::new();
    let outcome = run_phases(command, session, ctx, request, listener, monitor, &mut resources);

    debug!(command = id, resources = resources.len(), "saving sync info");
    let saved = save_resources(ctx, &resources, &SubMonitor::new(monitor, SAVE_WORK));
    monitor.done();

    match (outcome, saved) {
        (Ok(status), Ok(())) => Ok(status),
        (Ok(_), Err(save_error)) => Err(save_error),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(save_error)) => {
            warn!(command = id, error = %save_error, "failed to save sync info after command failure");
            Err(error)
        }
    }
}

/// Everything before the save, filling `resources` as soon as they resolve.
fn run_phases<C: Command + ?Sized>(
    command: &C,
    session: &mut Session,
    ctx: &Context,
    request: &Request,
    listener: &dyn OutputListener,
    monitor: &dyn ProgressMonitor,
    resources: &mut Vec<ResourceHandle>,
) -> Result<CommandStatus, CommandError> {
    let id = command.command_id();

    debug!(command = id, "resolving resources");
    *resources = command.compute_work_resources(session, request)?;
    reload_resources(
        ctx,
        session,
        resources,
        &SubMonitor::new(monitor, RESOLVE_WORK),
    )?;
    check_cancelled(monitor)?;

    session.set_no_local_changes(DO_NOT_CHANGE.is_element_of(&request.global_options));
    session.set_mod_time(None);

    debug!(command = id, "sending options");
    for option in &request.global_options {
        option.send(session)?;
    }
    for option in &request.local_options {
        option.send(session)?;
    }

    debug!(command = id, "sending local state");
    let local_state = SubMonitor::new(monitor, LOCAL_STATE_WORK);
    command.send_local_resource_state(session, request, resources, &local_state)?;
    local_state.done();
    check_cancelled(monitor)?;

    command.send_local_working_directory(session)?;
    command.send_arguments(session, request)?;
    session.send_command(id)?;

    debug!(command = id, "processing responses");
    let status = process_responses(
        session,
        ctx,
        id,
        listener,
        &SubMonitor::new(monitor, RESPONSE_WORK),
    )?;
    debug!(command = id, status = %status, "responses processed");

    let finish = SubMonitor::new(monitor, FINISH_WORK);
    command.command_finished(session, request, resources, status.is_server_error(), &finish)?;
    finish.done();
    Ok(status)
}

fn reload_resources(
    ctx: &Context,
    session: &Session,
    resources: &[ResourceHandle],
    monitor: &dyn ProgressMonitor,
) -> Result<(), CommandError> {
    monitor.begin_task("reloading sync info", resources.len() as u32);
    for resource in resources {
        if !resource.is_local() {
            debug!(path = %resource.path(), "skipping reload of non-local resource");
        } else if session.workspace().exists(resource.path()) {
            ctx.sync_store.reload(resource)?;
        }
        monitor.worked(1);
    }
    monitor.done();
    Ok(())
}

/// Save every resource, continuing past failures; the first failure is returned.
fn save_resources(
    ctx: &Context,
    resources: &[ResourceHandle],
    monitor: &dyn ProgressMonitor,
) -> Result<(), CommandError> {
    monitor.begin_task("saving sync info", resources.len() as u32);
    let mut first_error = None;
    for resource in resources {
        if !resource.is_local() {
            debug!(path = %resource.path(), "skipping save of non-local resource");
        } else if let Err(e) = ctx.sync_store.save(resource) {
            debug!(path = %resource.path(), error = %e, "save failed");
            first_error.get_or_insert(e);
        }
        monitor.worked(1);
    }
    monitor.done();
    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
