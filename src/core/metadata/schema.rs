//! core::metadata::schema
//!
//! Sync metadata types.
//!
//! # Entry Lines
//!
//! A file's sync info travels as an entry line:
//!
//! ```text
//! /name/revision/timestamp/options/tagspec
//! ```
//!
//! The revision `0` marks a file scheduled for addition and a leading `-`
//! marks one scheduled for removal. The timestamp field is either the file's
//! modification time in `asctime` form (UTC), [`MERGE_TIMESTAMP`], or empty.
//!
//! # Validation
//!
//! Parsing is strict: an entry line must start with `/` and carry exactly
//! five fields. Tagspecs are validated through [`Tag::from_tagspec`].

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::types::{Tag, TypeError};

/// Timestamp recorded for files whose contents came from a server-side merge.
pub const MERGE_TIMESTAMP: &str = "Result of merge";

/// Errors from sync metadata parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("malformed entry line '{line}': {reason}")]
    MalformedEntry { line: String, reason: String },

    #[error("invalid tag in entry: {0}")]
    Tag(#[from] TypeError),
}

/// Format a modification time the way entry lines record it.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use cvsclient::core::metadata::format_entry_timestamp;
///
/// let time = Utc.with_ymd_and_hms(2002, 1, 7, 10, 0, 0).unwrap();
/// assert_eq!(format_entry_timestamp(&time), "Mon Jan  7 10:00:00 2002");
/// ```
pub fn format_entry_timestamp(time: &DateTime<Utc>) -> String {
    time.format("%a %b %e %H:%M:%S %Y").to_string()
}

/// Sync info of a single managed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSyncInfo {
    /// File name (single path component).
    pub name: String,
    /// Revision, `0` for added, `-rev` for removed.
    pub revision: String,
    /// Recorded timestamp; empty when unknown.
    pub timestamp: String,
    /// Keyword substitution options such as `-kb`.
    pub keyword_mode: String,
    /// Sticky tag, if any.
    pub tag: Option<Tag>,
}

impl ResourceSyncInfo {
    /// Create sync info for a file at a revision with no timestamp.
    pub fn new(name: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            revision: revision.into(),
            timestamp: String::new(),
            keyword_mode: String::new(),
            tag: None,
        }
    }

    /// Parse an entry line.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::MalformedEntry` if the line does not have the
    /// `/name/revision/timestamp/options/tagspec` shape.
    pub fn parse(line: &str) -> Result<Self, SyncError> {
        let malformed = |reason: &str| SyncError::MalformedEntry {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let body = line
            .strip_prefix('/')
            .ok_or_else(|| malformed("must start with '/'"))?;
        let fields: Vec<&str> = body.split('/').collect();
        if fields.len() != 5 {
            return Err(malformed("expected five fields"));
        }
        if fields[0].is_empty() {
            return Err(malformed("name is empty"));
        }

        let tag = if fields[4].is_empty() {
            None
        } else {
            Some(Tag::from_tagspec(fields[4])?)
        };

        Ok(Self {
            name: fields[0].to_string(),
            revision: fields[1].to_string(),
            timestamp: fields[2].to_string(),
            keyword_mode: fields[3].to_string(),
            tag,
        })
    }

    /// Render as an entry line.
    pub fn to_entry_line(&self) -> String {
        let tagspec = self
            .tag
            .as_ref()
            .and_then(Tag::to_tagspec)
            .unwrap_or_default();
        format!(
            "/{}/{}/{}/{}/{}",
            self.name, self.revision, self.timestamp, self.keyword_mode, tagspec
        )
    }

    /// Whether the file is scheduled for addition.
    pub fn is_added(&self) -> bool {
        self.revision == "0"
    }

    /// Whether the file is scheduled for removal.
    pub fn is_deleted(&self) -> bool {
        self.revision.starts_with('-')
    }

    /// Whether the contents came from a merge and have not been touched since.
    pub fn is_merged(&self) -> bool {
        self.timestamp.starts_with(MERGE_TIMESTAMP)
    }
}

/// Sync info of a managed folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSyncInfo {
    /// Repository directory, relative to the repository root.
    pub repository: String,
    /// The repository root (`CVSROOT`) the folder belongs to.
    pub root: String,
    /// Sticky tag applied to the whole folder.
    pub tag: Option<Tag>,
    /// Static folders do not receive new files on update.
    pub is_static: bool,
}

impl FolderSyncInfo {
    /// Create folder sync info with no tag that is not static.
    pub fn new(repository: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            root: root.into(),
            tag: None,
            is_static: false,
        }
    }

    /// Builder: set the sticky tag.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Builder: mark static.
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }
}
