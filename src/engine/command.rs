//! engine::command
//!
//! The `Command` trait: per-kind hooks of the invocation lifecycle.
//!
//! # Architecture
//!
//! A command is a stateless singleton. Everything that varies per call
//! travels in a [`Request`] and in local variables of the runner, so one
//! command value can serve concurrent invocations on different sessions.
//!
//! The lifecycle itself is fixed (see [`runner`](super::runner)). A command
//! kind supplies its protocol identifier and the one hook with no safe
//! default, [`Command::send_local_resource_state`]. Every other hook has a
//! default that a command overrides when its request framing differs.
//!
//! # Example
//!
//! ```
//! use cvsclient::engine::command::{Command, Request};
//! use cvsclient::engine::progress::ProgressMonitor;
//! use cvsclient::engine::CommandError;
//! use cvsclient::session::Session;
//! use cvsclient::workspace::ResourceHandle;
//!
//! struct Version;
//!
//! impl Command for Version {
//!     fn command_id(&self) -> &'static str {
//!         "version"
//!     }
//!
//!     fn send_local_resource_state(
//!         &self,
//!         _session: &mut Session,
//!         _request: &Request,
//!         _resources: &[ResourceHandle],
//!         _monitor: &dyn ProgressMonitor,
//!     ) -> Result<(), CommandError> {
//!         Ok(())
//!     }
//! }
//! ```

use tracing::debug;

use super::listener::{DefaultListener, OutputListener};
use super::options::{CommandOption, GlobalOption, LocalOption};
use super::progress::ProgressMonitor;
use super::runner;
use super::{CommandError, CommandResult, Context};
use crate::core::config::Config;
use crate::core::types::ResourcePath;
use crate::session::Session;
use crate::workspace::{ResourceHandle, WorkspaceError};

/// The caller-supplied part of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Global options, in transmission order.
    pub global_options: Vec<GlobalOption>,
    /// Local options, in transmission order.
    pub local_options: Vec<LocalOption>,
    /// Positional arguments, usually paths relative to the working root.
    pub arguments: Vec<String>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// A request starting with the configured quietness option.
    ///
    /// Normal verbosity adds nothing.
    pub fn from_config(config: &Config) -> Self {
        let mut request = Self::new();
        let quietness = config.quietness_option();
        if !quietness.flag().is_empty() {
            request.global_options.push(quietness);
        }
        request
    }

    /// Builder: append a global option.
    pub fn global(mut self, option: GlobalOption) -> Self {
        self.global_options.push(option);
        self
    }

    /// Builder: append a local option.
    pub fn local(mut self, option: LocalOption) -> Self {
        self.local_options.push(option);
        self
    }

    /// Builder: append an argument.
    pub fn argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Builder: append several arguments.
    pub fn arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }
}

/// A command kind.
///
/// Implementations must not hold per-invocation state.
pub trait Command: Send + Sync {
    /// The protocol request that runs this command, e.g. `co`.
    fn command_id(&self) -> &'static str;

    /// Tell the server about the local state of `resources`.
    fn send_local_resource_state(
        &self,
        session: &mut Session,
        request: &Request,
        resources: &[ResourceHandle],
        monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError>;

    /// Resolve the request's arguments to the resources the command works on.
    ///
    /// Defaults to [`default_work_resources`].
    fn compute_work_resources(
        &self,
        session: &Session,
        request: &Request,
    ) -> Result<Vec<ResourceHandle>, CommandError> {
        default_work_resources(session, &request.arguments)
    }

    /// Declare the working directory.
    ///
    /// A managed root sends its recorded repository; otherwise the root is
    /// declared as the repository root itself.
    fn send_local_working_directory(&self, session: &mut Session) -> Result<(), CommandError> {
        let root = session.local_root();
        if session.workspace().is_managed_folder(root.path()) {
            session.send_local_root_directory()?;
        } else {
            session.send_constructed_root_directory()?;
        }
        Ok(())
    }

    /// Send the positional arguments, one `Argument` each.
    fn send_arguments(&self, session: &mut Session, request: &Request) -> Result<(), CommandError> {
        for argument in &request.arguments {
            session.send_argument(argument)?;
        }
        Ok(())
    }

    /// Local cleanup after the response stream was consumed.
    ///
    /// `server_error` is true when the server answered `error`.
    fn command_finished(
        &self,
        _session: &mut Session,
        _request: &Request,
        _resources: &[ResourceHandle],
        _server_error: bool,
        _monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError> {
        Ok(())
    }

    /// Listener used when the caller passes none.
    fn default_listener(&self) -> &dyn OutputListener {
        &DefaultListener
    }

    /// Run the command.
    ///
    /// `listener` defaults to [`Command::default_listener`] and `monitor` to
    /// a monitor that never cancels.
    fn execute(
        &self,
        session: &mut Session,
        ctx: &Context,
        request: &Request,
        listener: Option<&dyn OutputListener>,
        monitor: Option<&dyn ProgressMonitor>,
    ) -> CommandResult {
        runner::run_command(self, session, ctx, request, listener, monitor)
    }
}

/// Resolve arguments against the working root.
///
/// No arguments means the root itself. Arguments not under version control
/// resolve to plain handles instead of failing, so tracked and untracked
/// paths can be mixed in one request.
pub fn default_work_resources(
    session: &Session,
    arguments: &[String],
) -> Result<Vec<ResourceHandle>, CommandError> {
    if arguments.is_empty() {
        return Ok(vec![session.local_root()]);
    }

    let workspace = session.workspace();
    arguments
        .iter()
        .map(|argument| -> Result<ResourceHandle, CommandError> {
            let path = ResourcePath::new(argument.as_str())?;
            match workspace.child(&path) {
                Ok(handle) => Ok(handle),
                Err(WorkspaceError::NotFound(_)) => {
                    debug!(path = %path, "argument not managed, using plain resource");
                    Ok(workspace.plain(&path))
                }
                Err(e) => Err(e.into()),
            }
        })
        .collect()
}

/// Fail unless every resource lives in a managed folder.
///
/// A folder must itself be managed; a file must have a managed parent.
/// Folders that do not exist yet pass.
pub fn check_resources_managed(
    session: &Session,
    resources: &[ResourceHandle],
) -> Result<(), CommandError> {
    let workspace = session.workspace();
    for resource in resources {
        let folder = resource.folder_path();
        if !workspace.is_managed_folder(&folder) && workspace.exists(&folder) {
            return Err(CommandError::NotManaged(resource.path().to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Quietness;
    use crate::core::metadata::FolderSyncInfo;
    use crate::session::mock::MockConnection;
    use crate::workspace::memory::MemoryWorkspace;

    fn session() -> Session {
        let workspace = MemoryWorkspace::new()
            .with_root_sync(FolderSyncInfo::new("module", "/cvsroot"))
            .with_folder("src", Some(FolderSyncInfo::new("module/src", "/cvsroot")))
            .with_managed_file("src/a.c", b"", "1.1")
            .with_file("src/new.c", b"")
            .with_folder("build", None)
            .with_file("build/out.o", b"");
        Session::new(Box::new(MockConnection::new()), Box::new(workspace), "/cvsroot")
    }

    mod resources {
        use super::*;

        #[test]
        fn no_arguments_means_root() {
            let session = session();
            let resources = default_work_resources(&session, &[]).unwrap();
            assert_eq!(resources, vec![session.local_root()]);
        }

        #[test]
        fn unmanaged_arguments_fall_back_to_plain() {
            let session = session();
            let args = vec!["src/a.c".to_string(), "src/new.c".to_string(), "build".to_string()];
            let resources = default_work_resources(&session, &args).unwrap();
            assert_eq!(resources.len(), 3);
            assert_eq!(resources[1].path().as_str(), "src/new.c");
            assert!(!resources[1].is_folder());
            assert!(resources[2].is_folder());
        }

        #[test]
        fn invalid_argument() {
            let session = session();
            let args = vec!["../outside".to_string()];
            assert!(matches!(
                default_work_resources(&session, &args),
                Err(CommandError::InvalidArgument(_))
            ));
        }
    }

    mod managed {
        use super::*;

        #[test]
        fn files_in_managed_folders_pass() {
            let session = session();
            let args = vec!["src/a.c".to_string(), "src/new.c".to_string()];
            let resources = default_work_resources(&session, &args).unwrap();
            assert!(check_resources_managed(&session, &resources).is_ok());
        }

        #[test]
        fn unmanaged_folder_fails() {
            let session = session();
            let args = vec!["build/out.o".to_string()];
            let resources = default_work_resources(&session, &args).unwrap();
            assert!(matches!(
                check_resources_managed(&session, &resources),
                Err(CommandError::NotManaged(path)) if path == "build/out.o"
            ));
        }
    }

    #[test]
    fn request_from_config_carries_quietness() {
        let mut config = Config::default();
        assert!(Request::from_config(&config).global_options.is_empty());

        config.global.quietness = Some(Quietness::Silent);
        let request = Request::from_config(&config).local(LocalOption::new("-l"));
        assert_eq!(request.global_options.len(), 1);
        assert_eq!(request.global_options[0].flag(), "-Q");
    }

    #[test]
    fn request_builder_keeps_order() {
        let request = Request::new()
            .argument("b")
            .arguments(["c", "a"])
            .local(LocalOption::new("-l"));
        assert_eq!(request.arguments, vec!["b", "c", "a"]);
        assert_eq!(request.local_options.len(), 1);
    }
}
