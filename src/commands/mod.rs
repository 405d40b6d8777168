//! commands
//!
//! The command kinds and the session handshake.
//!
//! # Design
//!
//! Each kind is a unit struct with one process-wide static instance
//! ([`UPDATE`], [`COMMIT`], ...). The statics hold no state, so any number
//! of threads can run the same kind at once, each on its own session.
//! [`CommandKind`] maps protocol identifiers to the statics.
//!
//! # Example
//!
//! ```
//! use cvsclient::commands::CommandKind;
//!
//! let kind: CommandKind = "ci".parse().unwrap();
//! assert_eq!(kind, CommandKind::Commit);
//! assert_eq!(kind.command().command_id(), "ci");
//! ```

pub mod add;
pub mod admin;
pub mod checkout;
pub mod commit;
pub mod diff;
pub mod import;
pub mod log;
pub mod remove;
pub mod status;
pub mod tag;
pub mod update;
pub mod valid_requests;

pub use add::{Add, ADD};
pub use admin::{Admin, ADMIN};
pub use checkout::{Checkout, CHECKOUT};
pub use commit::{Commit, COMMIT};
pub use diff::{Diff, DIFF};
pub use import::{Import, IMPORT};
pub use log::{Log, LOG};
pub use remove::{Remove, REMOVE};
pub use status::{Status, STATUS};
pub use tag::{TagCommand, TAG};
pub use update::{Update, UPDATE};
pub use valid_requests::{ValidRequests, VALID_REQUESTS};

use std::str::FromStr;

use thiserror::Error;

use crate::engine::command::{Command, Request};
use crate::engine::options::{CommandOption, DO_NOT_RECURSE};
use crate::engine::progress::ProgressMonitor;
use crate::engine::visitor::FileStructureVisitor;
use crate::engine::{CommandError, CommandResult, Context};
use crate::session::Session;
use crate::workspace::ResourceHandle;

/// A command identifier that names no known command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown command: '{0}'")]
pub struct UnknownCommand(pub String);

/// Every command kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Add,
    Admin,
    Checkout,
    Commit,
    Diff,
    Import,
    Log,
    Remove,
    Status,
    Tag,
    Update,
    ValidRequests,
}

impl CommandKind {
    pub const ALL: [CommandKind; 12] = [
        CommandKind::Add,
        CommandKind::Admin,
        CommandKind::Checkout,
        CommandKind::Commit,
        CommandKind::Diff,
        CommandKind::Import,
        CommandKind::Log,
        CommandKind::Remove,
        CommandKind::Status,
        CommandKind::Tag,
        CommandKind::Update,
        CommandKind::ValidRequests,
    ];

    /// The static instance of this kind.
    pub fn command(self) -> &'static dyn Command {
        match self {
            CommandKind::Add => &ADD,
            CommandKind::Admin => &ADMIN,
            CommandKind::Checkout => &CHECKOUT,
            CommandKind::Commit => &COMMIT,
            CommandKind::Diff => &DIFF,
            CommandKind::Import => &IMPORT,
            CommandKind::Log => &LOG,
            CommandKind::Remove => &REMOVE,
            CommandKind::Status => &STATUS,
            CommandKind::Tag => &TAG,
            CommandKind::Update => &UPDATE,
            CommandKind::ValidRequests => &VALID_REQUESTS,
        }
    }

    /// The protocol identifier.
    pub fn id(self) -> &'static str {
        self.command().command_id()
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for CommandKind {
    type Err = UnknownCommand;

    /// Accepts protocol identifiers and the long names of `co` and `ci`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checkout" => Ok(CommandKind::Checkout),
            "commit" => Ok(CommandKind::Commit),
            _ => CommandKind::ALL
                .into_iter()
                .find(|kind| kind.id() == s)
                .ok_or_else(|| UnknownCommand(s.to_string())),
        }
    }
}

/// Open the conversation with the server.
///
/// Sends `Root` and the `Valid-responses` list of the context's registry,
/// then runs `valid-requests` so the session learns what the server accepts.
pub fn handshake(session: &mut Session, ctx: &Context) -> CommandResult {
    session.send_root()?;
    session.send_valid_responses(&ctx.registry.response_list())?;
    VALID_REQUESTS.execute(session, ctx, &Request::new(), None, None)
}

/// Describe `resources` with a [`FileStructureVisitor`], honoring `-l`.
pub(crate) fn send_structure(
    session: &mut Session,
    request: &Request,
    resources: &[ResourceHandle],
    monitor: &dyn ProgressMonitor,
    modified_only: bool,
    send_empty_folders: bool,
) -> Result<(), CommandError> {
    FileStructureVisitor::new(session)
        .modified_only(modified_only)
        .send_empty_folders(send_empty_folders)
        .recurse(!DO_NOT_RECURSE.is_element_of(&request.local_options))
        .visit(resources, monitor)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_parse() {
        for kind in CommandKind::ALL {
            assert_eq!(kind.to_string().parse::<CommandKind>(), Ok(kind));
        }
    }

    #[test]
    fn long_names_and_unknown() {
        assert_eq!("checkout".parse::<CommandKind>(), Ok(CommandKind::Checkout));
        assert_eq!(CommandKind::Checkout.id(), "co");
        assert_eq!(
            "frobnicate".parse::<CommandKind>(),
            Err(UnknownCommand("frobnicate".into()))
        );
    }

    #[test]
    fn statics_match_kinds() {
        assert_eq!(CommandKind::ValidRequests.id(), "valid-requests");
        assert_eq!(CommandKind::Tag.command().command_id(), "tag");
    }
}
