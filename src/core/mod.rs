//! core
//!
//! Core domain types, schemas and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ResourcePath, Tag, TagKind
//! - [`status`] - Command outcome: Severity, StatusEntry, CommandStatus
//! - [`metadata`] - Sync metadata schema and the SyncStore persistence seam
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid paths and tags at construction
//! - Entry lines and tagspecs round-trip through their wire form
//! - Nothing here talks to the server

pub mod config;
pub mod metadata;
pub mod status;
pub mod types;
