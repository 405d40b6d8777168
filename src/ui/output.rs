//! ui::output
//!
//! Console echo of server messages.
//!
//! # Design
//!
//! [`ConsoleListener`] is the listener installed as the context's console.
//! `M` lines go to its out sink and `E` lines to its err sink. Echo is
//! advisory: a failed write is logged and otherwise ignored, and the
//! listener never contributes status entries.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::core::config::Quietness;
use crate::core::status::StatusEntry;
use crate::engine::listener::OutputListener;
use crate::engine::progress::ProgressMonitor;
use crate::workspace::ResourceHandle;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet mode - error lines only
    Quiet,
    /// Normal mode - message and error lines
    #[default]
    Normal,
    /// Debug mode - lines keep their response keyword
    Debug,
}

impl Verbosity {
    /// Verbosity matching a configured quietness level.
    ///
    /// Partly quiet still echoes; the server already trims what it sends.
    pub fn from_quietness(quietness: Quietness) -> Self {
        match quietness {
            Quietness::Verbose | Quietness::PartlyQuiet => Verbosity::Normal,
            Quietness::Silent => Verbosity::Quiet,
        }
    }
}

type Sink = Mutex<Box<dyn Write + Send>>;

/// Writes server messages to a pair of sinks.
pub struct ConsoleListener {
    out: Sink,
    err: Sink,
    verbosity: Verbosity,
}

impl std::fmt::Debug for ConsoleListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleListener")
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

impl ConsoleListener {
    pub fn new(
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
            verbosity,
        }
    }

    /// Listener over the process's stdout and stderr.
    pub fn stdio(verbosity: Verbosity) -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()), verbosity)
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn echo(&self, sink: &Sink, keyword: &str, line: &str) {
        let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
        let written = if self.verbosity == Verbosity::Debug {
            writeln!(sink, "{} {}", keyword, line)
        } else {
            writeln!(sink, "{}", line)
        };
        if let Err(e) = written.and_then(|()| sink.flush()) {
            warn!(keyword, error = %e, "failed to echo server message");
        }
    }
}

impl OutputListener for ConsoleListener {
    fn message_line(
        &self,
        line: &str,
        _root: &ResourceHandle,
        _monitor: &dyn ProgressMonitor,
    ) -> Option<StatusEntry> {
        if self.verbosity != Verbosity::Quiet {
            self.echo(&self.out, "M", line);
        }
        None
    }

    fn error_line(
        &self,
        line: &str,
        _root: &ResourceHandle,
        _monitor: &dyn ProgressMonitor,
    ) -> Option<StatusEntry> {
        self.echo(&self.err, "E", line);
        None
    }
}
