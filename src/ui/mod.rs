//! ui
//!
//! Console output.
//!
//! # Modules
//!
//! - [`output`] - Console echo of server messages
//!
//! # Design
//!
//! The engine never writes to the terminal itself. A context may carry a
//! console listener; sessions with echo enabled mirror every `M` and `E`
//! line to it in addition to the command's own listener.

pub mod output;

pub use output::{ConsoleListener, Verbosity};
