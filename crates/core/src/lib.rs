//! Core types for swinstall stacks
//!
//! This crate defines the foundational types used throughout the system:
//! - Error: error type and taxonomy classes
//! - Timestamp: `YYYYMMDD-HHMMSS` wire timestamp and revision codec
//! - VersionKey: schema 1 composite version (timestamp + revision)
//! - SchemaId: schema identifier tag
//! - FileMetadata: resolved-version record returned by every query
//! - StackPaths: path convention linking a versionless file to its stack

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod contract;
pub mod error;
pub mod metadata;
pub mod paths;
pub mod types;

// Re-export commonly used types
pub use error::{ErrorKind, Result, StackError};
pub use metadata::{FileMetadata, Schema1Metadata, Schema2Metadata};
pub use paths::{StackLayout, StackPaths, DEFAULT_BAK_DIR, DEFAULT_STACK_SUFFIX};
pub use types::{Action, InstallRequest, StackVersion};

// Re-export contract types at crate root for convenience
pub use contract::{
    validate_revision, SchemaId, Timestamp, VersionKey, REVISION_SEPARATOR, SCHEMA_V1, SCHEMA_V2,
    TIMESTAMP_FORMAT,
};
