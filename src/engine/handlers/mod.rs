//! engine::handlers
//!
//! Response handlers and the registry that maps keywords to them.
//!
//! # Architecture
//!
//! The dispatch loop handles `ok`, `error`, `M` and `E` itself. Every other
//! response keyword is looked up in a [`HandlerRegistry`] built once during
//! setup and shared read-only (behind an `Arc` in the
//! [`Context`](crate::engine::Context)) by every invocation. Supporting a new
//! response is one more `register` call; the dispatch loop does not change.
//!
//! Handlers read any further lines of their response from the session
//! themselves. When the session is in no-local-changes mode they still
//! consume their input but leave the workspace untouched.
//!
//! # Modules
//!
//! - [`entries`] - Per-file sync changes (`Checked-in`, `Removed`, ...)
//! - [`folders`] - Folder flags (`Set-sticky`, `Set-static-directory`, ...)
//! - [`updated`] - File contents (`Updated`, `Merged`)
//! - [`requests`] - `Valid-requests`
//!
//! # Example
//!
//! ```
//! use cvsclient::engine::handlers::HandlerRegistry;
//!
//! let registry = HandlerRegistry::standard();
//! assert!(registry.get("Updated").is_some());
//! assert!(registry.get("ok").is_none());
//! assert!(registry.response_list().starts_with("ok error M E "));
//! ```

pub mod entries;
pub mod folders;
pub mod requests;
pub mod updated;

use std::collections::BTreeMap;

use thiserror::Error;

use super::progress::ProgressMonitor;
use super::CommandError;
use crate::core::types::ResourcePath;
use crate::session::Session;

/// Keywords the dispatch loop handles itself.
pub const RESERVED_KEYWORDS: [&str; 4] = ["ok", "error", "M", "E"];

/// Errors from building a registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("'{0}' is handled by the dispatch loop and cannot be registered")]
    ReservedKeyword(String),
}

/// Applies one kind of response to the session.
pub trait ResponseHandler: Send + Sync {
    /// The response keyword this handler serves.
    fn keyword(&self) -> &'static str;

    /// Handle one response. `argument` is the text after the keyword.
    fn handle(
        &self,
        session: &mut Session,
        argument: &str,
        monitor: &dyn ProgressMonitor,
    ) -> Result<(), CommandError>;
}

/// Immutable keyword to handler table.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<&'static str, Box<dyn ResponseHandler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("keywords", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    /// Registry with every standard handler.
    pub fn standard() -> Self {
        Self::builder().with_standard_handlers().build()
    }

    /// Exact-match lookup.
    pub fn get(&self, keyword: &str) -> Option<&dyn ResponseHandler> {
        self.handlers.get(keyword).map(|handler| handler.as_ref())
    }

    /// Registered keywords in sorted order.
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Space-delimited list of every response the client accepts.
    pub fn response_list(&self) -> String {
        RESERVED_KEYWORDS
            .iter()
            .copied()
            .chain(self.keywords())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Builder for [`HandlerRegistry`].
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: BTreeMap<&'static str, Box<dyn ResponseHandler>>,
}

impl HandlerRegistryBuilder {
    /// Add a handler, replacing any earlier one for the same keyword.
    ///
    /// # Errors
    ///
    /// `RegistryError::ReservedKeyword` for `ok`, `error`, `M` and `E`.
    pub fn register<H>(mut self, handler: H) -> Result<Self, RegistryError>
    where
        H: ResponseHandler + 'static,
    {
        let keyword = handler.keyword();
        if RESERVED_KEYWORDS.contains(&keyword) {
            return Err(RegistryError::ReservedKeyword(keyword.to_string()));
        }
        self.handlers.insert(keyword, Box::new(handler));
        Ok(self)
    }

    /// Add the standard handlers.
    pub fn with_standard_handlers(mut self) -> Self {
        let standard: Vec<Box<dyn ResponseHandler>> = vec![
            Box::new(entries::CheckedInHandler),
            Box::new(entries::CopyFileHandler),
            Box::new(entries::ModTimeHandler),
            Box::new(entries::RemovedHandler),
            Box::new(entries::RemoveEntryHandler),
            Box::new(folders::StaticDirectoryHandler::set()),
            Box::new(folders::StaticDirectoryHandler::clear()),
            Box::new(folders::StickyHandler::set()),
            Box::new(folders::StickyHandler::clear()),
            Box::new(updated::UpdatedHandler::updated()),
            Box::new(updated::UpdatedHandler::merged()),
            Box::new(requests::ValidRequestsHandler),
        ];
        for handler in standard {
            self.handlers.insert(handler.keyword(), handler);
        }
        self
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}

// =============================================================================
// Shared line parsing
// =============================================================================

/// A file named by a `<local dir>` argument and a repository file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileTarget {
    pub folder: ResourcePath,
    pub file: ResourcePath,
    /// Repository directory of the folder, relative to the repository root.
    pub repository: String,
}

/// Parse the local directory argument of a response.
pub(crate) fn local_dir(argument: &str) -> Result<ResourcePath, CommandError> {
    ResourcePath::new(argument).map_err(|e| {
        CommandError::MalformedResponse(format!("bad local directory '{}': {}", argument, e))
    })
}

/// Read the repository-file line that follows a file response and resolve it
/// against the local directory argument.
pub(crate) fn read_file_target(
    session: &mut Session,
    argument: &str,
) -> Result<FileTarget, CommandError> {
    let folder = local_dir(argument)?;
    let remote = session.read_line()?;
    let (remote_dir, name) = remote.rsplit_once('/').ok_or_else(|| {
        CommandError::MalformedResponse(format!("bad repository file '{}'", remote))
    })?;
    let file = folder.join(name).map_err(|e| {
        CommandError::MalformedResponse(format!("bad file name '{}': {}", name, e))
    })?;
    let repository = session.relative_repository_path(remote_dir).to_string();
    Ok(FileTarget {
        folder,
        file,
        repository,
    })
}

/// Read the repository-directory line that follows a folder response.
pub(crate) fn read_folder_repository(session: &mut Session) -> Result<String, CommandError> {
    let remote = session.read_line()?;
    let remote = remote.trim_end_matches('/');
    Ok(session.relative_repository_path(remote).to_string())
}
