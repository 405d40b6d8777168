//! core::status
//!
//! Result values of a command invocation.
//!
//! # Design
//!
//! A command either fails locally with a `CommandError` (protocol fault,
//! I/O failure, cancellation) or completes with a [`CommandStatus`]. A
//! server-side `error` response is a completed command, not a local fault,
//! so callers must inspect the status rather than rely on `?`.
//!
//! Non-fatal [`StatusEntry`] values produced while the response stream is
//! read are carried in the status in arrival order.

/// Severity of a status entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What produced a status entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// An `E` line from the server.
    ErrorLine,
    /// An `M` line a listener chose to surface.
    MessageLine,
    /// Anything else a listener reports.
    Other,
}

/// A single non-fatal status produced during response processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub severity: Severity,
    pub code: StatusCode,
    pub message: String,
}

impl StatusEntry {
    /// Create a new entry.
    pub fn new(severity: Severity, code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
        }
    }

    /// An error-severity entry for an `E` line.
    pub fn error_line(line: impl Into<String>) -> Self {
        Self::new(Severity::Error, StatusCode::ErrorLine, line)
    }

    /// A warning-severity entry.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, StatusCode::Other, message)
    }
}

impl std::fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Aggregate outcome of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    /// The server answered `ok` and nothing noteworthy was reported.
    Ok,

    /// The server answered `ok`, but listeners reported statuses.
    Warnings {
        /// Summary message naming the command.
        message: String,
        /// Reported statuses in arrival order.
        entries: Vec<StatusEntry>,
    },

    /// The server answered `error`.
    ServerError {
        /// The server's message, or a generic one if it sent none.
        message: String,
        /// Statuses reported before the error, in arrival order.
        entries: Vec<StatusEntry>,
    },
}

impl CommandStatus {
    /// Check if the command succeeded without warnings.
    pub fn is_ok(&self) -> bool {
        matches!(self, CommandStatus::Ok)
    }

    /// Check if the command succeeded, with or without warnings.
    pub fn is_success(&self) -> bool {
        !self.is_server_error()
    }

    /// Check if the server reported an error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, CommandStatus::ServerError { .. })
    }

    /// Top-level message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            CommandStatus::Ok => None,
            CommandStatus::Warnings { message, .. } | CommandStatus::ServerError { message, .. } => {
                Some(message.as_str())
            }
        }
    }

    /// Accumulated entries (empty for `Ok`).
    pub fn entries(&self) -> &[StatusEntry] {
        match self {
            CommandStatus::Ok => &[],
            CommandStatus::Warnings { entries, .. }
            | CommandStatus::ServerError { entries, .. } => entries,
        }
    }

    /// Most severe entry severity, if any entries exist.
    pub fn max_severity(&self) -> Option<Severity> {
        self.entries().iter().map(|e| e.severity).max()
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandStatus::Ok => write!(f, "ok"),
            CommandStatus::Warnings { message, entries } => {
                write!(f, "{} ({} warnings)", message, entries.len())
            }
            CommandStatus::ServerError { message, .. } => write!(f, "server error: {}", message),
        }
    }
}
