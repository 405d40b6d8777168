//! engine::options
//!
//! Command options: global, quiet, and local flags.
//!
//! # Design
//!
//! An option is an immutable flag with an optional argument. Option slices
//! are transmitted in order, but membership queries ([`CommandOption::is_element_of`],
//! [`find_option`]) and argument collection ([`collect_option_arguments`])
//! compare flags only.
//!
//! Send rules per variant:
//! - **Global**: `Global_option <flag>`
//! - **Quiet**: a global option whose empty flag ([`VERBOSE`]) sends nothing
//! - **Local**: the flag, then the argument if present, as two `Argument`s
//!
//! # Example
//!
//! ```
//! use cvsclient::engine::options::{
//!     collect_option_arguments, make_message_option, CommandOption, LocalOption, DO_NOT_RECURSE,
//! };
//!
//! let options = vec![make_message_option("fix"), DO_NOT_RECURSE];
//! assert!(DO_NOT_RECURSE.is_element_of(&options));
//! assert_eq!(collect_option_arguments(&options, "-m"), vec!["fix"]);
//! ```

use std::borrow::Cow;

use thiserror::Error;

use crate::core::types::{Tag, TagKind};
use crate::session::{Session, SessionError};

/// Usage faults raised while building options.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionError {
    /// HEAD has no `-r`/`-D` representation.
    #[error("sticky tag not valid for trunk (HEAD)")]
    HeadTag,
}

/// Behavior shared by every option variant.
pub trait CommandOption {
    /// The flag, e.g. `-r`.
    fn flag(&self) -> &str;

    /// The argument, if the option carries one.
    fn argument(&self) -> Option<&str>;

    /// Transmit the option according to its variant's rule.
    fn send(&self, session: &mut Session) -> Result<(), SessionError>;

    /// Whether some element of `options` has the same flag, ignoring arguments.
    fn is_element_of<O: CommandOption>(&self, options: &[O]) -> bool
    where
        Self: Sized,
    {
        find_option(options, self.flag()).is_some()
    }
}

/// Find the first option with the given flag.
pub fn find_option<'a, O: CommandOption>(options: &'a [O], flag: &str) -> Option<&'a O> {
    options.iter().find(|o| o.flag() == flag)
}

/// Collect the arguments of every option with the given flag, in order.
///
/// Options without an argument contribute nothing.
pub fn collect_option_arguments<'a, O: CommandOption>(options: &'a [O], flag: &str) -> Vec<&'a str> {
    options
        .iter()
        .filter(|o| o.flag() == flag)
        .filter_map(|o| o.argument())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GlobalKind {
    Plain,
    Quiet,
}

/// An option affecting the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalOption {
    flag: Cow<'static, str>,
    kind: GlobalKind,
}

impl GlobalOption {
    /// A global option sent unconditionally.
    pub const fn new(flag: &'static str) -> Self {
        Self {
            flag: Cow::Borrowed(flag),
            kind: GlobalKind::Plain,
        }
    }

    /// A quietness option; the empty flag is a no-op sentinel.
    pub const fn quiet(flag: &'static str) -> Self {
        Self {
            flag: Cow::Borrowed(flag),
            kind: GlobalKind::Quiet,
        }
    }

    /// A global option with a runtime flag such as `-z3`.
    pub fn custom(flag: impl Into<String>) -> Self {
        Self {
            flag: Cow::Owned(flag.into()),
            kind: GlobalKind::Plain,
        }
    }

    /// Whether this is a quietness option.
    pub fn is_quiet(&self) -> bool {
        self.kind == GlobalKind::Quiet
    }
}

impl CommandOption for GlobalOption {
    fn flag(&self) -> &str {
        &self.flag
    }

    fn argument(&self) -> Option<&str> {
        None
    }

    fn send(&self, session: &mut Session) -> Result<(), SessionError> {
        if self.kind == GlobalKind::Quiet && self.flag.is_empty() {
            return Ok(());
        }
        session.send_global_option(&self.flag)
    }
}

/// An option whose meaning depends on the command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalOption {
    flag: Cow<'static, str>,
    argument: Option<String>,
}

impl LocalOption {
    /// A flag-only local option.
    pub const fn new(flag: &'static str) -> Self {
        Self {
            flag: Cow::Borrowed(flag),
            argument: None,
        }
    }

    /// A local option with an argument.
    pub fn with_argument(flag: &'static str, argument: impl Into<String>) -> Self {
        Self {
            flag: Cow::Borrowed(flag),
            argument: Some(argument.into()),
        }
    }
}

impl CommandOption for LocalOption {
    fn flag(&self) -> &str {
        &self.flag
    }

    fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    fn send(&self, session: &mut Session) -> Result<(), SessionError> {
        session.send_argument(&self.flag)?;
        if let Some(argument) = &self.argument {
            session.send_argument(argument)?;
        }
        Ok(())
    }
}

// =============================================================================
// Global options
// =============================================================================

/// Do not change any local files.
pub const DO_NOT_CHANGE: GlobalOption = GlobalOption::new("-n");
/// Do not record this operation in the command history.
pub const DO_NOT_LOG: GlobalOption = GlobalOption::new("-l");
/// Make new working files read-only.
pub const MAKE_READ_ONLY: GlobalOption = GlobalOption::new("-r");
/// Trace command execution on the server.
pub const TRACE_EXECUTION: GlobalOption = GlobalOption::new("-t");

/// Normal verbosity.
pub const VERBOSE: GlobalOption = GlobalOption::quiet("");
/// Suppress informational messages.
pub const PARTLY_QUIET: GlobalOption = GlobalOption::quiet("-q");
/// Silent but for serious problems.
pub const SILENT: GlobalOption = GlobalOption::quiet("-Q");

// =============================================================================
// Local options common to many commands
// =============================================================================

/// Valid for: annotate checkout commit diff export log rdiff remove rtag status tag update
pub const DO_NOT_RECURSE: LocalOption = LocalOption::new("-l");
/// Valid for: add checkout export import update
pub const KSUBST_BINARY: LocalOption = LocalOption::new("-kb");
/// Valid for: checkout export update
pub const PRUNE_EMPTY_DIRECTORIES: LocalOption = LocalOption::new("-P");

/// Make a `-m` log message option.
///
/// Valid for: add commit import
pub fn make_message_option(message: impl Into<String>) -> LocalOption {
    LocalOption::with_argument("-m", message)
}

/// Make a `-r` or `-D` option selecting a tag.
///
/// Valid for: checkout export history rdiff update
///
/// # Errors
///
/// Returns `OptionError::HeadTag` for HEAD.
pub fn make_tag_option(tag: &Tag) -> Result<LocalOption, OptionError> {
    match tag.kind() {
        TagKind::Branch | TagKind::Version => Ok(LocalOption::with_argument("-r", tag.name())),
        TagKind::Date => Ok(LocalOption::with_argument("-D", tag.name())),
        TagKind::Head => Err(OptionError::HeadTag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::MockConnection;
    use crate::workspace::memory::MemoryWorkspace;

    fn session() -> (Session, MockConnection) {
        let connection = MockConnection::new();
        let session = Session::new(
            Box::new(connection.clone()),
            Box::new(MemoryWorkspace::new()),
            "/cvsroot",
        );
        (session, connection)
    }

    mod membership {
        use super::*;

        #[test]
        fn matches_by_flag_only() {
            let options = vec![LocalOption::with_argument("-r", "v1")];
            assert!(LocalOption::new("-r").is_element_of(&options));
            assert!(LocalOption::with_argument("-r", "other").is_element_of(&options));
            assert!(!LocalOption::new("-D").is_element_of(&options));
        }

        #[test]
        fn empty_slice_has_no_members() {
            let options: Vec<GlobalOption> = Vec::new();
            assert!(!DO_NOT_CHANGE.is_element_of(&options));
        }

        #[test]
        fn find_returns_first_match() {
            let options = vec![
                LocalOption::with_argument("-r", "first"),
                LocalOption::with_argument("-r", "second"),
            ];
            assert_eq!(find_option(&options, "-r").unwrap().argument(), Some("first"));
        }
    }

    mod collect {
        use super::*;

        #[test]
        fn preserves_order_and_skips_missing_arguments() {
            let options = vec![
                LocalOption::with_argument("-r", "a"),
                LocalOption::new("-r"),
                DO_NOT_RECURSE,
                LocalOption::with_argument("-r", "b"),
            ];
            assert_eq!(collect_option_arguments(&options, "-r"), vec!["a", "b"]);
            assert!(collect_option_arguments(&options, "-l").is_empty());
        }
    }

    mod send {
        use super::*;

        #[test]
        fn verbose_sends_nothing() {
            let (mut session, connection) = session();
            VERBOSE.send(&mut session).unwrap();
            assert!(connection.sent_lines().is_empty());
        }

        #[test]
        fn quiet_sends_flag() {
            let (mut session, connection) = session();
            PARTLY_QUIET.send(&mut session).unwrap();
            assert_eq!(connection.sent_lines(), vec!["Global_option -q"]);
        }

        #[test]
        fn plain_global_with_empty_flag_is_still_sent() {
            let (mut session, connection) = session();
            GlobalOption::custom("").send(&mut session).unwrap();
            assert_eq!(connection.sent_lines(), vec!["Global_option "]);
        }

        #[test]
        fn local_sends_flag_then_argument() {
            let (mut session, connection) = session();
            make_message_option("initial import").send(&mut session).unwrap();
            DO_NOT_RECURSE.send(&mut session).unwrap();
            assert_eq!(
                connection.sent_lines(),
                vec!["Argument -m", "Argument initial import", "Argument -l"]
            );
        }
    }

    mod builders {
        use super::*;

        #[test]
        fn tag_option_flags() {
            let branch = make_tag_option(&Tag::branch("stable").unwrap()).unwrap();
            assert_eq!((branch.flag(), branch.argument()), ("-r", Some("stable")));

            let version = make_tag_option(&Tag::version("rel-1").unwrap()).unwrap();
            assert_eq!(version.flag(), "-r");

            let date = make_tag_option(&Tag::date("14 Jan 2002").unwrap()).unwrap();
            assert_eq!((date.flag(), date.argument()), ("-D", Some("14 Jan 2002")));
        }

        #[test]
        fn head_tag_is_rejected_at_construction() {
            assert_eq!(make_tag_option(&Tag::head()), Err(OptionError::HeadTag));
        }

        #[test]
        fn quiet_constants() {
            assert!(VERBOSE.is_quiet());
            assert!(SILENT.is_quiet());
            assert!(!DO_NOT_CHANGE.is_quiet());
        }
    }
}
