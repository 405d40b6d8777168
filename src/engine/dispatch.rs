//! engine::dispatch
//!
//! The response dispatch loop.
//!
//! # Design
//!
//! Each response line is split at its first space into a keyword and an
//! argument and classified on its own:
//!
//! | keyword | action |
//! |---|---|
//! | `ok` | stop; success, with warnings if any entries accumulated |
//! | `error` | stop; server error carrying the accumulated entries |
//! | `M` | listener message callback, then console echo |
//! | `E` | listener error callback, then console echo |
//! | other | registered handler, or a fatal `UnsupportedResponse` |
//!
//! Cancellation is polled before every blocking read. Handlers may read
//! further lines themselves; the loop resumes after them.

use tracing::{trace, warn};

use super::listener::OutputListener;
use super::progress::{ProgressMonitor, ResponseProgress};
use super::{check_cancelled, CommandError, Context};
use crate::core::status::{CommandStatus, StatusEntry};
use crate::session::Session;

/// One classified response line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseLine<'a> {
    Ok,
    Error(&'a str),
    Message(&'a str),
    ErrorMessage(&'a str),
    Other { keyword: &'a str, argument: &'a str },
}

impl<'a> ResponseLine<'a> {
    /// Classify a line.
    ///
    /// ```
    /// use cvsclient::engine::dispatch::ResponseLine;
    ///
    /// assert_eq!(ResponseLine::parse("M hello world"), ResponseLine::Message("hello world"));
    /// assert_eq!(ResponseLine::parse("ok"), ResponseLine::Ok);
    /// assert_eq!(
    ///     ResponseLine::parse("Mod-time 14 Jan 2002 10:00:00 -0000"),
    ///     ResponseLine::Other { keyword: "Mod-time", argument: "14 Jan 2002 10:00:00 -0000" },
    /// );
    /// ```
    pub fn parse(line: &'a str) -> Self {
        let (keyword, argument) = line.split_once(' ').unwrap_or((line, ""));
        match keyword {
            "ok" => ResponseLine::Ok,
            "error" => ResponseLine::Error(argument),
            "M" => ResponseLine::Message(argument),
            "E" => ResponseLine::ErrorMessage(argument),
            _ => ResponseLine::Other { keyword, argument },
        }
    }
}

/// Message used when the server's `error` line carries no text.
pub fn generic_error_message(command_id: &str) -> String {
    format!(
        "The server reported an error while performing the \"{}\" command",
        command_id
    )
}

/// Message of a success that accumulated entries.
pub fn warnings_message(command_id: &str) -> String {
    format!("The server reported warnings for the {} command", command_id)
}

/// Consume responses until `ok` or `error`.
///
/// # Errors
///
/// Fails on cancellation, a channel fault, an unregistered keyword, or a
/// handler fault. A server `error` is returned as
/// [`CommandStatus::ServerError`].
pub fn process_responses(
    session: &mut Session,
    ctx: &Context,
    command_id: &str,
    listener: &dyn OutputListener,
    monitor: &dyn ProgressMonitor,
) -> Result<CommandStatus, CommandError> {
    monitor.begin_task("receiving responses", ctx.progress.total_work);
    let mut progress = ResponseProgress::new(ctx.progress);
    let mut entries: Vec<StatusEntry> = Vec::new();
    let root = session.local_root();

    let status = loop {
        check_cancelled(monitor)?;
        let line = session.read_line()?;
        trace!(command = command_id, line = %line, "response");

        match ResponseLine::parse(&line) {
            ResponseLine::Ok => {
                break if entries.is_empty() {
                    CommandStatus::Ok
                } else {
                    CommandStatus::Warnings {
                        message: warnings_message(command_id),
                        entries,
                    }
                };
            }
            ResponseLine::Error(argument) => {
                let message = if argument.trim().is_empty() {
                    generic_error_message(command_id)
                } else {
                    argument.to_string()
                };
                break CommandStatus::ServerError { message, entries };
            }
            ResponseLine::Message(text) => {
                entries.extend(listener.message_line(text, &root, monitor));
                if let Some(console) = console_for(session, ctx) {
                    console.message_line(text, &root, monitor);
                }
            }
            ResponseLine::ErrorMessage(text) => {
                entries.extend(listener.error_line(text, &root, monitor));
                if let Some(console) = console_for(session, ctx) {
                    console.error_line(text, &root, monitor);
                }
            }
            ResponseLine::Other { keyword, argument } => {
                let handler = ctx.registry.get(keyword).ok_or_else(|| {
                    warn!(keyword, "unsupported response");
                    CommandError::UnsupportedResponse(keyword.to_string())
                })?;
                handler.handle(session, argument, monitor)?;
            }
        }

        let units = progress.tick();
        if units > 0 {
            monitor.worked(units);
        }
    };

    monitor.done();
    Ok(status)
}

fn console_for<'c>(
    session: &Session,
    ctx: &'c Context,
) -> Option<&'c (dyn OutputListener + Send + Sync)> {
    if session.is_output_to_console() {
        ctx.console.as_deref()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::NullSyncStore;
    use crate::core::status::Severity;
    use crate::engine::handlers::HandlerRegistry;
    use crate::engine::listener::DefaultListener;
    use crate::engine::progress::{NullMonitor, RecordingMonitor};
    use crate::session::mock::MockConnection;
    use crate::workspace::memory::MemoryWorkspace;
    use std::sync::Arc;

    fn context() -> Context {
        Context::new(Arc::new(HandlerRegistry::standard()), Arc::new(NullSyncStore))
    }

    fn session(connection: MockConnection) -> Session {
        Session::new(Box::new(connection), Box::new(MemoryWorkspace::new()), "/cvsroot")
    }

    fn run(lines: &[&str]) -> Result<CommandStatus, CommandError> {
        let connection = MockConnection::new().with_lines(lines.iter().copied());
        process_responses(
            &mut session(connection),
            &context(),
            "update",
            &DefaultListener,
            &NullMonitor,
        )
    }

    mod classification {
        use super::*;

        #[test]
        fn keyword_without_argument() {
            assert_eq!(ResponseLine::parse("error"), ResponseLine::Error(""));
            assert_eq!(ResponseLine::parse("M"), ResponseLine::Message(""));
            assert_eq!(
                ResponseLine::parse("Clear-sticky"),
                ResponseLine::Other {
                    keyword: "Clear-sticky",
                    argument: ""
                }
            );
        }

        #[test]
        fn splits_at_first_space_only() {
            assert_eq!(ResponseLine::parse("E a  b "), ResponseLine::ErrorMessage("a  b "));
            assert_eq!(ResponseLine::parse("M "), ResponseLine::Message(""));
        }

        #[test]
        fn keywords_are_case_sensitive() {
            assert!(matches!(ResponseLine::parse("OK"), ResponseLine::Other { .. }));
            assert!(matches!(ResponseLine::parse("m hi"), ResponseLine::Other { .. }));
        }
    }

    mod termination {
        use super::*;

        #[test]
        fn ok_without_entries_is_plain_success() {
            assert_eq!(run(&["M hello", "ok"]).unwrap(), CommandStatus::Ok);
        }

        #[test]
        fn ok_with_entries_is_warnings() {
            let status = run(&["E careful", "ok"]).unwrap();
            assert!(status.is_success());
            assert!(!status.is_ok());
            assert_eq!(status.entries().len(), 1);
            assert_eq!(status.message(), Some(warnings_message("update").as_str()));
        }

        #[test]
        fn error_carries_message_and_entries() {
            let status = run(&["E oops", "error bad thing"]).unwrap();
            assert!(status.is_server_error());
            assert_eq!(status.message(), Some("bad thing"));
            assert_eq!(status.entries().len(), 1);
            assert_eq!(status.entries()[0].message, "oops");
            assert_eq!(status.entries()[0].severity, Severity::Error);
        }

        #[test]
        fn empty_error_uses_generic_message() {
            let status = run(&["error "]).unwrap();
            assert_eq!(status.message(), Some(generic_error_message("update").as_str()));

            let status = run(&["error"]).unwrap();
            assert_eq!(status.message(), Some(generic_error_message("update").as_str()));
        }

        #[test]
        fn lines_after_termination_are_not_read() {
            let connection = MockConnection::new().with_lines(["ok", "M later"]);
            process_responses(
                &mut session(connection.clone()),
                &context(),
                "update",
                &DefaultListener,
                &NullMonitor,
            )
            .unwrap();
            assert_eq!(connection.lines_read(), 1);
        }
    }

    mod faults {
        use super::*;

        #[test]
        fn unknown_keyword_aborts_before_ok() {
            let connection = MockConnection::new().with_lines(["ZZZ foo", "ok"]);
            let result = process_responses(
                &mut session(connection.clone()),
                &context(),
                "update",
                &DefaultListener,
                &NullMonitor,
            );
            assert!(matches!(
                result,
                Err(CommandError::UnsupportedResponse(ref k)) if k == "ZZZ"
            ));
            assert_eq!(connection.lines_read(), 1);
        }

        #[test]
        fn closed_channel_is_protocol_fault() {
            let error = run(&["M partial"]).unwrap_err();
            assert!(error.is_protocol_fault());
        }

        #[test]
        fn cancellation_before_first_read() {
            let connection = MockConnection::new().with_lines(["ok"]);
            let monitor = RecordingMonitor::new();
            monitor.cancel();
            let result = process_responses(
                &mut session(connection.clone()),
                &context(),
                "update",
                &DefaultListener,
                &monitor,
            );
            assert!(matches!(result, Err(CommandError::Cancelled)));
            assert_eq!(connection.lines_read(), 0);
        }
    }

    #[test]
    fn progress_reported_within_budget() {
        let lines: Vec<String> = (0..1000)
            .map(|i| format!("M line {}", i))
            .chain(std::iter::once("ok".to_string()))
            .collect();
        let connection = MockConnection::new().with_lines(lines);
        let monitor = RecordingMonitor::new();
        process_responses(
            &mut session(connection),
            &context(),
            "update",
            &DefaultListener,
            &monitor,
        )
        .unwrap();
        assert!(monitor.total_worked() > 0);
        assert!(monitor.total_worked() < context().progress.total_work);
        assert_eq!(monitor.done_count(), 1);
    }
}
