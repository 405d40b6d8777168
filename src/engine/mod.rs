//! engine
//!
//! Drives one command invocation against a session.
//!
//! # Architecture
//!
//! Every command follows the same lifecycle, enforced by
//! [`runner::run_command`]:
//!
//! ```text
//! Resolve -> Reload -> Send options -> Send local state -> Send working dir
//!     -> Send arguments -> Send command -> Dispatch responses -> Finish -> Save
//! ```
//!
//! The per-command variation lives in the [`Command`] trait hooks. The
//! response stream is consumed by [`dispatch::process_responses`], which
//! hands non-message responses to the [`HandlerRegistry`].
//!
//! # Invariants
//!
//! - Sync metadata is reloaded before any request is sent
//! - Sync metadata is saved exactly once per invocation, on every exit path
//! - Commands carry no per-invocation state
//! - The handler registry is never mutated after construction
//! - A server `error` response is a [`CommandStatus`] value, not a
//!   [`CommandError`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cvsclient::commands::STATUS;
//! use cvsclient::core::metadata::{FolderSyncInfo, MemorySyncStore};
//! use cvsclient::engine::{Command, Context, HandlerRegistry, Request};
//! use cvsclient::session::{mock::MockConnection, Session};
//! use cvsclient::workspace::memory::MemoryWorkspace;
//!
//! let ctx = Context::new(Arc::new(HandlerRegistry::standard()), Arc::new(MemorySyncStore::new()));
//! let workspace = MemoryWorkspace::new().with_root_sync(FolderSyncInfo::new("module", "/cvsroot"));
//! let connection = MockConnection::new().with_lines(["M Up-to-date", "ok"]);
//! let mut session = Session::new(Box::new(connection), Box::new(workspace), "/cvsroot");
//!
//! let status = STATUS.execute(&mut session, &ctx, &Request::new(), None, None).unwrap();
//! assert!(status.is_ok());
//! ```

pub mod command;
pub mod dispatch;
pub mod handlers;
pub mod listener;
pub mod options;
pub mod progress;
pub mod runner;
pub mod visitor;

pub use command::{check_resources_managed, default_work_resources, Command, Request};
pub use dispatch::{process_responses, ResponseLine};
pub use handlers::{HandlerRegistry, HandlerRegistryBuilder, RegistryError, ResponseHandler};
pub use listener::{DefaultListener, OutputListener};
pub use options::{CommandOption, GlobalOption, LocalOption, OptionError};
pub use progress::{NullMonitor, ProgressMonitor, ProgressTuning, SubMonitor};
pub use runner::run_command;
pub use visitor::FileStructureVisitor;

use std::sync::Arc;

use thiserror::Error;

use crate::core::config::Config;
use crate::core::metadata::{SyncError, SyncStore, SyncStoreError};
use crate::core::status::CommandStatus;
use crate::core::types::TypeError;
use crate::session::SessionError;
use crate::ui::output::{ConsoleListener, Verbosity};
use crate::workspace::WorkspaceError;

/// Shared collaborators of command invocations.
///
/// Cloning is cheap. One context serves any number of concurrent
/// invocations, each on its own session.
#[derive(Clone)]
pub struct Context {
    /// Handlers for non-message responses.
    pub registry: Arc<HandlerRegistry>,
    /// Durable storage of sync metadata.
    pub sync_store: Arc<dyn SyncStore>,
    /// Receives `M`/`E` lines of sessions with console echo enabled.
    pub console: Option<Arc<dyn OutputListener + Send + Sync>>,
    /// Response-phase progress tuning.
    pub progress: ProgressTuning,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("registry", &self.registry)
            .field("console", &self.console.is_some())
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Context with no console and default progress tuning.
    pub fn new(registry: Arc<HandlerRegistry>, sync_store: Arc<dyn SyncStore>) -> Self {
        Self {
            registry,
            sync_store,
            console: None,
            progress: ProgressTuning::default(),
        }
    }

    /// Builder: echo server messages to `console`.
    pub fn with_console(mut self, console: Arc<dyn OutputListener + Send + Sync>) -> Self {
        self.console = Some(console);
        self
    }

    /// Builder: set progress tuning.
    pub fn with_progress(mut self, progress: ProgressTuning) -> Self {
        self.progress = progress;
        self
    }

    /// Context for the standard handlers, configured from `config`.
    ///
    /// A stdio console is installed; the silent quietness level suppresses
    /// its message lines. Whether a session echoes at all is the session's
    /// own setting (see [`Config::echo_to_console`]).
    pub fn from_config(config: &Config, sync_store: Arc<dyn SyncStore>) -> Self {
        let verbosity = Verbosity::from_quietness(config.quietness());
        Self::new(Arc::new(HandlerRegistry::standard()), sync_store)
            .with_console(Arc::new(ConsoleListener::stdio(verbosity)))
            .with_progress(config.progress_tuning())
    }
}

/// Fatal faults of a command invocation.
///
/// A server-reported failure is not one of these; it is returned as
/// [`CommandStatus::ServerError`].
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    SyncStore(#[from] SyncStoreError),

    #[error("invalid sync info: {0}")]
    Sync(#[from] SyncError),

    /// The server sent a response keyword with no registered handler.
    #[error("unsupported response from server: '{0}'")]
    UnsupportedResponse(String),

    /// A known response did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("'{0}' is not under version control")]
    NotManaged(String),

    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] TypeError),
}

impl CommandError {
    /// Whether this is a fault of the response stream or the channel.
    pub fn is_protocol_fault(&self) -> bool {
        matches!(
            self,
            CommandError::Session(_)
                | CommandError::UnsupportedResponse(_)
                | CommandError::MalformedResponse(_)
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CommandError::Cancelled)
    }
}

/// Fail with `CommandError::Cancelled` if the monitor was cancelled.
pub fn check_cancelled(monitor: &dyn ProgressMonitor) -> Result<(), CommandError> {
    if monitor.is_cancelled() {
        Err(CommandError::Cancelled)
    } else {
        Ok(())
    }
}

/// Convenience alias for invocation results.
pub type CommandResult = Result<CommandStatus, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::NullSyncStore;
    use crate::engine::progress::RecordingMonitor;

    #[test]
    fn protocol_fault_classification() {
        assert!(CommandError::UnsupportedResponse("ZZZ".into()).is_protocol_fault());
        assert!(CommandError::MalformedResponse("x".into()).is_protocol_fault());
        assert!(CommandError::Session(SessionError::Closed).is_protocol_fault());
        assert!(!CommandError::Cancelled.is_protocol_fault());
        assert!(!CommandError::NotManaged("a".into()).is_protocol_fault());
    }

    #[test]
    fn check_cancelled_follows_monitor() {
        let monitor = RecordingMonitor::new();
        assert!(check_cancelled(&monitor).is_ok());
        monitor.cancel();
        assert!(check_cancelled(&monitor).unwrap_err().is_cancelled());
    }

    #[test]
    fn context_from_config() {
        let config = Config::default();
        let ctx = Context::from_config(&config, Arc::new(NullSyncStore));
        assert!(ctx.console.is_some());
        assert_eq!(ctx.progress, ProgressTuning::default());
        assert_eq!(ctx.registry.len(), 12);
    }
}
