//! engine::listener
//!
//! Callbacks for the message lines of a response stream.
//!
//! `M` lines carry standard output of the server-side command and `E`
//! lines its standard error. A listener interprets them for one command
//! (an update listener might turn `M U file` into a status entry) and may
//! return a status entry to accumulate into the command's result.

use crate::core::status::StatusEntry;
use crate::workspace::ResourceHandle;

use super::progress::ProgressMonitor;

/// Interprets `M` and `E` lines.
pub trait OutputListener {
    /// Called with the argument of an `M` line.
    fn message_line(
        &self,
        line: &str,
        root: &ResourceHandle,
        monitor: &dyn ProgressMonitor,
    ) -> Option<StatusEntry>;

    /// Called with the argument of an `E` line.
    fn error_line(
        &self,
        line: &str,
        root: &ResourceHandle,
        monitor: &dyn ProgressMonitor,
    ) -> Option<StatusEntry>;
}

/// Listener used when the caller supplies none.
///
/// Messages are dropped. Error lines become error entries so they surface in
/// the command's result.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultListener;

impl OutputListener for DefaultListener {
    fn message_line(
        &self,
        _line: &str,
        _root: &ResourceHandle,
        _monitor: &dyn ProgressMonitor,
    ) -> Option<StatusEntry> {
        None
    }

    fn error_line(
        &self,
        line: &str,
        _root: &ResourceHandle,
        _monitor: &dyn ProgressMonitor,
    ) -> Option<StatusEntry> {
        Some(StatusEntry::error_line(line))
    }
}
