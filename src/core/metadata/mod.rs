//! core::metadata
//!
//! Sync metadata schema and persistence.
//!
//! # Modules
//!
//! - [`schema`] - Entry lines and folder sync info
//! - [`store`] - The `SyncStore` persistence collaborator
//!
//! # Architecture
//!
//! Sync metadata is the locally cached bookkeeping (revision, sticky tag,
//! modification time) that ties a working resource to the repository. The
//! workspace owns the live values; the store reloads them from and persists
//! them to durable storage around each command.
//!
//! # Example
//!
//! ```
//! use cvsclient::core::metadata::schema::ResourceSyncInfo;
//!
//! let info = ResourceSyncInfo::parse("/main.c/1.4/Mon Jan 14 10:00:00 2002//").unwrap();
//! assert_eq!(info.name, "main.c");
//! assert_eq!(info.revision, "1.4");
//! ```

pub mod schema;
pub mod store;

pub use schema::{format_entry_timestamp, FolderSyncInfo, ResourceSyncInfo, SyncError, MERGE_TIMESTAMP};
pub use store::{MemorySyncStore, NullSyncStore, StoreFailOn, StoreOperation, SyncStore, SyncStoreError};
