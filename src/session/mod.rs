//! session
//!
//! The request/response channel a command drives.
//!
//! # Architecture
//!
//! A [`Session`] pairs an opaque [`Connection`] (the line channel to the
//! server) with the opaque local [`Workspace`]. It encodes requests in the
//! line-oriented client/server protocol and carries the transient per-command
//! state that response handlers consult (no-local-changes mode, pending
//! modification time, the server's valid requests).
//!
//! A session is exclusively owned by one in-flight command at a time.
//!
//! # Modules
//!
//! - [`stream`] - `Connection` over any `BufRead` + `Write` pair
//! - [`mock`] - Scripted connection for deterministic tests
//!
//! # Example
//!
//! ```
//! use cvsclient::session::{mock::MockConnection, Session};
//! use cvsclient::workspace::memory::MemoryWorkspace;
//!
//! let connection = MockConnection::new();
//! let mut session = Session::new(
//!     Box::new(connection.clone()),
//!     Box::new(MemoryWorkspace::new()),
//!     "/cvsroot",
//! );
//! session.send_argument("file.c").unwrap();
//! assert_eq!(connection.sent_lines(), vec!["Argument file.c"]);
//! ```

pub mod mock;
pub mod stream;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::config::Config;
use crate::core::types::ResourcePath;
use crate::workspace::{ResourceHandle, Workspace};

/// Errors from the channel.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Underlying I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server closed the connection.
    #[error("connection closed by server")]
    Closed,

    /// A read did not complete in time.
    #[error("timed out waiting for server response")]
    Timeout,

    /// The byte stream violated the protocol framing.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// A line-oriented channel to the server.
///
/// Implementations own the transport; the engine only reads and writes
/// lines and counted byte blocks.
pub trait Connection: Send {
    /// Write one line; the implementation appends the terminator.
    fn write_line(&mut self, line: &str) -> Result<(), SessionError>;

    /// Write raw bytes (file contents).
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SessionError>;

    /// Block until a full line arrives; the terminator is stripped.
    fn read_line(&mut self) -> Result<String, SessionError>;

    /// Block until exactly `len` bytes arrive.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, SessionError>;

    /// Push buffered output to the server.
    fn flush(&mut self) -> Result<(), SessionError> {
        Ok(())
    }
}

/// An open session with the server.
pub struct Session {
    connection: Box<dyn Connection>,
    workspace: Box<dyn Workspace>,
    repository_root: String,
    no_local_changes: bool,
    mod_time: Option<DateTime<Utc>>,
    valid_requests: Option<BTreeSet<String>>,
    output_to_console: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("repository_root", &self.repository_root)
            .field("no_local_changes", &self.no_local_changes)
            .field("mod_time", &self.mod_time)
            .field("output_to_console", &self.output_to_console)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session over an established connection.
    ///
    /// `repository_root` is the server-side repository directory (the path
    /// part of `CVSROOT`).
    pub fn new(
        connection: Box<dyn Connection>,
        workspace: Box<dyn Workspace>,
        repository_root: impl Into<String>,
    ) -> Self {
        Self {
            connection,
            workspace,
            repository_root: repository_root.into(),
            no_local_changes: false,
            mod_time: None,
            valid_requests: None,
            output_to_console: true,
        }
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Send `Root`.
    pub fn send_root(&mut self) -> Result<(), SessionError> {
        let line = format!("Root {}", self.repository_root);
        self.connection.write_line(&line)
    }

    /// Send `Valid-responses` with a space-delimited keyword list.
    pub fn send_valid_responses(&mut self, keywords: &str) -> Result<(), SessionError> {
        self.connection
            .write_line(&format!("Valid-responses {}", keywords))
    }

    /// Send a positional argument.
    ///
    /// Arguments containing newlines continue on `Argumentx` lines.
    pub fn send_argument(&mut self, argument: &str) -> Result<(), SessionError> {
        let mut lines = argument.split('\n');
        let first = lines.next().unwrap_or("");
        self.connection.write_line(&format!("Argument {}", first))?;
        for line in lines {
            self.connection.write_line(&format!("Argumentx {}", line))?;
        }
        Ok(())
    }

    /// Send a global option flag.
    pub fn send_global_option(&mut self, flag: &str) -> Result<(), SessionError> {
        self.connection
            .write_line(&format!("Global_option {}", flag))
    }

    /// Declare a local directory and its repository directory.
    ///
    /// `repository` is relative to the repository root unless absolute.
    pub fn send_directory(
        &mut self,
        local: &ResourcePath,
        repository: &str,
    ) -> Result<(), SessionError> {
        let remote = self.remote_path(repository);
        self.connection
            .write_line(&format!("Directory {}", local.as_protocol_dir()))?;
        self.connection.write_line(&remote)
    }

    /// Declare the working root using its recorded repository directory.
    ///
    /// Falls back to the constructed root if the root has no sync info.
    pub fn send_local_root_directory(&mut self) -> Result<(), SessionError> {
        match self.workspace.folder_sync(&ResourcePath::root()) {
            Some(info) => self.send_directory(&ResourcePath::root(), &info.repository),
            None => self.send_constructed_root_directory(),
        }
    }

    /// Declare the working root as the repository root itself.
    pub fn send_constructed_root_directory(&mut self) -> Result<(), SessionError> {
        let root = self.repository_root.clone();
        self.send_directory(&ResourcePath::root(), &root)
    }

    /// Send an `Entry` line for the file about to be described.
    pub fn send_entry(&mut self, entry_line: &str) -> Result<(), SessionError> {
        self.connection.write_line(&format!("Entry {}", entry_line))
    }

    /// Upload a file's contents.
    pub fn send_modified(&mut self, name: &str, contents: &[u8]) -> Result<(), SessionError> {
        self.connection.write_line(&format!("Modified {}", name))?;
        self.connection.write_line("u=rw,g=r,o=r")?;
        self.connection.write_line(&contents.len().to_string())?;
        self.connection.write_bytes(contents)
    }

    /// Report a file as unchanged since checkout.
    pub fn send_unchanged(&mut self, name: &str) -> Result<(), SessionError> {
        self.connection.write_line(&format!("Unchanged {}", name))
    }

    /// Report a file as modified without sending its contents.
    pub fn send_is_modified(&mut self, name: &str) -> Result<(), SessionError> {
        self.connection.write_line(&format!("Is-modified {}", name))
    }

    /// Report a resource the server knows nothing about.
    pub fn send_questionable(&mut self, name: &str) -> Result<(), SessionError> {
        self.connection
            .write_line(&format!("Questionable {}", name))
    }

    /// Mark the most recently declared directory as static.
    pub fn send_static_directory(&mut self) -> Result<(), SessionError> {
        self.connection.write_line("Static-directory")
    }

    /// Declare the sticky tag of the most recently declared directory.
    pub fn send_sticky(&mut self, tagspec: &str) -> Result<(), SessionError> {
        self.connection.write_line(&format!("Sticky {}", tagspec))
    }

    /// Send the command request that completes a request sequence.
    pub fn send_command(&mut self, command_id: &str) -> Result<(), SessionError> {
        self.connection.write_line(command_id)?;
        self.connection.flush()
    }

    // =========================================================================
    // Responses
    // =========================================================================

    /// Block until the next response line arrives.
    pub fn read_line(&mut self) -> Result<String, SessionError> {
        self.connection.read_line()
    }

    /// Read a file transmission: a decimal size line followed by that many bytes.
    pub fn read_file_transmission(&mut self) -> Result<Vec<u8>, SessionError> {
        let size_line = self.connection.read_line()?;
        if size_line.starts_with('z') {
            return Err(SessionError::Protocol(
                "compressed file transmission is not supported".to_string(),
            ));
        }
        let size: usize = size_line.trim().parse().map_err(|_| {
            SessionError::Protocol(format!("invalid file size '{}'", size_line))
        })?;
        self.connection.read_bytes(size)
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Server-side repository root.
    pub fn repository_root(&self) -> &str {
        &self.repository_root
    }

    /// Resolve a repository path against the repository root.
    pub fn remote_path(&self, repository: &str) -> String {
        if repository.starts_with('/') {
            repository.to_string()
        } else if repository.is_empty() || repository == "." {
            self.repository_root.clone()
        } else {
            format!("{}/{}", self.repository_root.trim_end_matches('/'), repository)
        }
    }

    /// Strip the repository root from a server path, if it is under it.
    pub fn relative_repository_path<'a>(&self, remote: &'a str) -> &'a str {
        let root = self.repository_root.trim_end_matches('/');
        match remote.strip_prefix(root) {
            Some(rest) if rest.is_empty() => ".",
            Some(rest) if rest.starts_with('/') => &rest[1..],
            _ => remote,
        }
    }

    /// Handle of the working root.
    pub fn local_root(&self) -> ResourceHandle {
        self.workspace.root()
    }

    /// The local resource tree.
    pub fn workspace(&self) -> &dyn Workspace {
        self.workspace.as_ref()
    }

    /// The local resource tree, for handlers that update it.
    pub fn workspace_mut(&mut self) -> &mut dyn Workspace {
        self.workspace.as_mut()
    }

    /// Whether local files must be left untouched.
    pub fn no_local_changes(&self) -> bool {
        self.no_local_changes
    }

    pub fn set_no_local_changes(&mut self, value: bool) {
        self.no_local_changes = value;
    }

    /// Modification time announced by the last `Mod-time` response.
    pub fn mod_time(&self) -> Option<DateTime<Utc>> {
        self.mod_time
    }

    pub fn set_mod_time(&mut self, time: Option<DateTime<Utc>>) {
        self.mod_time = time;
    }

    /// Take the pending modification time, clearing it.
    pub fn take_mod_time(&mut self) -> Option<DateTime<Utc>> {
        self.mod_time.take()
    }

    /// Record the requests the server accepts.
    pub fn set_valid_requests<I, S>(&mut self, requests: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_requests = Some(requests.into_iter().map(Into::into).collect());
    }

    /// Whether the server accepts `request`.
    ///
    /// Every request is assumed valid until the server has told us otherwise.
    pub fn is_valid_request(&self, request: &str) -> bool {
        self.valid_requests
            .as_ref()
            .map_or(true, |requests| requests.contains(request))
    }

    /// Whether server messages are echoed to the console listener.
    pub fn is_output_to_console(&self) -> bool {
        self.output_to_console
    }

    pub fn set_output_to_console(&mut self, value: bool) {
        self.output_to_console = value;
    }

    /// Apply the per-session settings of `config`.
    pub fn configure(&mut self, config: &Config) {
        self.output_to_console = config.echo_to_console();
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockConnection;
    use super::stream::StreamConnection;
    use super::*;
    use crate::core::metadata::FolderSyncInfo;
    use crate::workspace::memory::MemoryWorkspace;

    fn session_with(workspace: MemoryWorkspace) -> (Session, MockConnection) {
        let connection = MockConnection::new();
        let session = Session::new(Box::new(connection.clone()), Box::new(workspace), "/cvsroot");
        (session, connection)
    }

    mod requests {
        use super::*;

        #[test]
        fn multi_line_argument_uses_argumentx() {
            let (mut session, connection) = session_with(MemoryWorkspace::new());
            session.send_argument("first\nsecond\nthird").unwrap();
            assert_eq!(
                connection.sent_lines(),
                vec!["Argument first", "Argumentx second", "Argumentx third"]
            );
        }

        #[test]
        fn local_root_directory_uses_recorded_repository() {
            let workspace =
                MemoryWorkspace::new().with_root_sync(FolderSyncInfo::new("module", "/cvsroot"));
            let (mut session, connection) = session_with(workspace);
            session.send_local_root_directory().unwrap();
            assert_eq!(
                connection.sent_lines(),
                vec!["Directory .", "/cvsroot/module"]
            );
        }

        #[test]
        fn constructed_root_directory() {
            let (mut session, connection) = session_with(MemoryWorkspace::new());
            session.send_constructed_root_directory().unwrap();
            assert_eq!(connection.sent_lines(), vec!["Directory .", "/cvsroot"]);
        }

        #[test]
        fn modified_sends_mode_size_and_bytes() {
            let (mut session, connection) = session_with(MemoryWorkspace::new());
            session.send_modified("a.txt", b"hello").unwrap();
            assert_eq!(
                connection.sent_lines(),
                vec!["Modified a.txt", "u=rw,g=r,o=r", "5"]
            );
            assert_eq!(connection.sent_bytes(), b"hello".to_vec());
        }

        #[test]
        fn command_flushes() {
            let (mut session, connection) = session_with(MemoryWorkspace::new());
            session.send_command("update").unwrap();
            assert_eq!(connection.sent_lines(), vec!["update"]);
            assert_eq!(connection.flush_count(), 1);
        }
    }

    mod responses {
        use super::*;

        #[test]
        fn reads_file_transmission() {
            let connection = MockConnection::new().with_line("5").with_bytes(b"hello");
            let mut session = Session::new(
                Box::new(connection),
                Box::new(MemoryWorkspace::new()),
                "/cvsroot",
            );
            assert_eq!(session.read_file_transmission().unwrap(), b"hello".to_vec());
        }

        #[test]
        fn rejects_compressed_and_bad_sizes() {
            let connection = MockConnection::new().with_line("z12").with_line("five");
            let mut session = Session::new(
                Box::new(connection),
                Box::new(MemoryWorkspace::new()),
                "/cvsroot",
            );
            assert!(matches!(
                session.read_file_transmission(),
                Err(SessionError::Protocol(_))
            ));
            assert!(matches!(
                session.read_file_transmission(),
                Err(SessionError::Protocol(_))
            ));
        }

        #[test]
        fn huge_size_over_stream_is_closed() {
            let connection = StreamConnection::new(
                std::io::Cursor::new(b"18446744073709551615\nabc".to_vec()),
                Vec::new(),
            );
            let mut session = Session::new(
                Box::new(connection),
                Box::new(MemoryWorkspace::new()),
                "/cvsroot",
            );
            assert!(matches!(
                session.read_file_transmission(),
                Err(SessionError::Closed)
            ));
        }
    }

    mod state {
        use super::*;

        #[test]
        fn configure_applies_echo_setting() {
            let (mut session, _) = session_with(MemoryWorkspace::new());
            assert!(session.is_output_to_console());

            let mut config = Config::default();
            config.global.echo_to_console = Some(false);
            session.configure(&config);
            assert!(!session.is_output_to_console());
        }

        #[test]
        fn remote_path_resolution() {
            let (session, _) = session_with(MemoryWorkspace::new());
            assert_eq!(session.remote_path("mod/src"), "/cvsroot/mod/src");
            assert_eq!(session.remote_path("/abs/path"), "/abs/path");
            assert_eq!(session.remote_path("."), "/cvsroot");
        }

        #[test]
        fn relative_repository_path() {
            let (session, _) = session_with(MemoryWorkspace::new());
            assert_eq!(session.relative_repository_path("/cvsroot/mod/a.c"), "mod/a.c");
            assert_eq!(session.relative_repository_path("/cvsroot"), ".");
            assert_eq!(session.relative_repository_path("/elsewhere/a.c"), "/elsewhere/a.c");
            assert_eq!(session.relative_repository_path("/cvsrootx/a.c"), "/cvsrootx/a.c");
        }

        #[test]
        fn valid_requests_default_to_permissive() {
            let (mut session, _) = session_with(MemoryWorkspace::new());
            assert!(session.is_valid_request("Sticky"));
            session.set_valid_requests(["Root", "Directory"]);
            assert!(session.is_valid_request("Root"));
            assert!(!session.is_valid_request("Sticky"));
        }

        #[test]
        fn take_mod_time_clears() {
            let (mut session, _) = session_with(MemoryWorkspace::new());
            let now = Utc::now();
            session.set_mod_time(Some(now));
            assert_eq!(session.take_mod_time(), Some(now));
            assert_eq!(session.mod_time(), None);
        }
    }
}
