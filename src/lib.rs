//! cvsclient - The command engine of a CVS client
//!
//! cvsclient drives CVS client/server protocol commands over an established
//! connection: it describes the local working tree to the server, sends the
//! command, and applies the server's line-oriented responses back to the
//! working tree and its sync metadata.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`commands`] - The command kinds (update, commit, ...) and the handshake
//! - [`engine`] - Runs the invocation lifecycle and dispatches responses
//! - [`session`] - Request/response channel over an opaque connection
//! - [`workspace`] - The local resource tree the responses modify
//! - [`core`] - Domain types, status model, sync metadata, configuration
//! - [`ui`] - Console echo of server messages
//!
//! # Correctness Invariants
//!
//! 1. Sync metadata is reloaded before a request is sent and saved exactly
//!    once after the command, whatever the outcome
//! 2. Every response line is handled by exactly one party: the dispatch loop
//!    for `ok`/`error`/`M`/`E`, otherwise a registered handler
//! 3. An unknown response keyword aborts the command
//! 4. Commands are stateless and may run concurrently on separate sessions

pub mod commands;
pub mod core;
pub mod engine;
pub mod session;
pub mod ui;
pub mod workspace;
