//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ResourcePath`] - Validated path of a resource relative to the working root
//! - [`Tag`] / [`TagKind`] - A sticky tag: HEAD, branch, version, or date
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so a path containing `..` or a tag name with
//! whitespace never reaches the wire.
//!
//! # Examples
//!
//! ```
//! use cvsclient::core::types::{ResourcePath, Tag, TagKind};
//!
//! let path = ResourcePath::new("src/main.c").unwrap();
//! assert_eq!(path.name(), "main.c");
//! assert_eq!(path.parent().unwrap().as_str(), "src");
//!
//! let tag = Tag::from_tagspec("Trelease-1").unwrap();
//! assert_eq!(tag.kind(), TagKind::Branch);
//!
//! assert!(ResourcePath::new("../escape").is_err());
//! ```

use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid resource path: {0}")]
    InvalidResourcePath(String),

    #[error("invalid tag name: {0}")]
    InvalidTagName(String),

    #[error("invalid tagspec: {0}")]
    InvalidTagSpec(String),
}

/// A validated path relative to the working root.
///
/// Paths use `/` separators. The empty path denotes the working root itself.
///
/// Rules:
/// - Cannot start with `/`
/// - Cannot contain empty, `.` or `..` components
/// - Cannot contain `\`, newlines, or NUL
///
/// A single trailing `/` and a leading `./` are accepted and stripped, since
/// the server names directories that way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Create a new validated path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidResourcePath` if the path escapes the root
    /// or contains characters the protocol cannot carry.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        let trimmed = path.strip_prefix("./").unwrap_or(&path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() || trimmed == "." {
            return Ok(Self::root());
        }
        Self::validate(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    /// The working root.
    pub fn root() -> Self {
        Self(String::new())
    }

    fn validate(path: &str) -> Result<(), TypeError> {
        if path.starts_with('/') {
            return Err(TypeError::InvalidResourcePath(format!(
                "'{}' must be relative",
                path
            )));
        }
        if path.contains(['\\', '\n', '\r', '\0']) {
            return Err(TypeError::InvalidResourcePath(format!(
                "'{}' contains an illegal character",
                path
            )));
        }
        for component in path.split('/') {
            if component.is_empty() || component == "." || component == ".." {
                return Err(TypeError::InvalidResourcePath(format!(
                    "'{}' has an invalid component '{}'",
                    path, component
                )));
            }
        }
        Ok(())
    }

    /// Whether this is the working root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The last path component, or the empty string for the root.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// The containing folder, or `None` for the root.
    pub fn parent(&self) -> Option<ResourcePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(pos) => Some(Self(self.0[..pos].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Append a single validated component.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidResourcePath` if `name` is not a single
    /// valid component.
    pub fn join(&self, name: &str) -> Result<ResourcePath, TypeError> {
        if name.contains('/') {
            return Err(TypeError::InvalidResourcePath(format!(
                "'{}' is not a single path component",
                name
            )));
        }
        if self.is_root() {
            ResourcePath::new(name)
        } else {
            ResourcePath::new(format!("{}/{}", self.0, name))
        }
    }

    /// The path as the protocol spells a local directory: `.` for the root.
    pub fn as_protocol_dir(&self) -> &str {
        if self.is_root() {
            "."
        } else {
            &self.0
        }
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_protocol_dir())
    }
}

/// The kind of a sticky tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// The trunk; has no wire representation.
    Head,
    /// A branch tag (`T` tagspec).
    Branch,
    /// A non-branch version tag (`N` tagspec).
    Version,
    /// A date (`D` tagspec).
    Date,
}

/// A tag naming a line of development or a point in history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    name: String,
    kind: TagKind,
}

impl Tag {
    /// The trunk.
    pub fn head() -> Self {
        Self {
            name: "HEAD".to_string(),
            kind: TagKind::Head,
        }
    }

    /// Create a branch tag.
    pub fn branch(name: impl Into<String>) -> Result<Self, TypeError> {
        Self::with_kind(name.into(), TagKind::Branch)
    }

    /// Create a version tag.
    pub fn version(name: impl Into<String>) -> Result<Self, TypeError> {
        Self::with_kind(name.into(), TagKind::Version)
    }

    /// Create a date tag. Dates may contain spaces; they are sent verbatim.
    pub fn date(date: impl Into<String>) -> Result<Self, TypeError> {
        Self::with_kind(date.into(), TagKind::Date)
    }

    fn with_kind(name: String, kind: TagKind) -> Result<Self, TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidTagName("tag name cannot be empty".into()));
        }
        if name.contains(['\n', '\r', '\0']) {
            return Err(TypeError::InvalidTagName(format!(
                "'{}' contains a line break",
                name.escape_debug()
            )));
        }
        if kind != TagKind::Date && name.contains(char::is_whitespace) {
            return Err(TypeError::InvalidTagName(format!(
                "'{}' contains whitespace",
                name
            )));
        }
        Ok(Self { name, kind })
    }

    /// Parse a protocol tagspec such as `Tbranch`, `Nrel-1` or `D2002.01.14.10.00.00`.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidTagSpec` for an unknown prefix or empty name.
    pub fn from_tagspec(spec: &str) -> Result<Self, TypeError> {
        let mut chars = spec.chars();
        let kind = match chars.next() {
            Some('T') => TagKind::Branch,
            Some('N') => TagKind::Version,
            Some('D') => TagKind::Date,
            _ => return Err(TypeError::InvalidTagSpec(spec.to_string())),
        };
        Self::with_kind(chars.as_str().to_string(), kind)
            .map_err(|_| TypeError::InvalidTagSpec(spec.to_string()))
    }

    /// The tagspec for this tag, or `None` for HEAD.
    pub fn to_tagspec(&self) -> Option<String> {
        let prefix = match self.kind {
            TagKind::Head => return None,
            TagKind::Branch => 'T',
            TagKind::Version => 'N',
            TagKind::Date => 'D',
        };
        Some(format!("{}{}", prefix, self.name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
