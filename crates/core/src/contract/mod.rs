//! Contract types shared by every schema
//!
//! - `timestamp`: the `YYYYMMDD-HHMMSS` wire timestamp and revision codec
//! - `version_key`: schema 1 composite version key
//! - `schema_id`: schema identifier tag

pub mod schema_id;
pub mod timestamp;
pub mod version_key;

// Re-exports
pub use schema_id::{SchemaId, SCHEMA_V1, SCHEMA_V2};
pub use timestamp::{Timestamp, REVISION_SEPARATOR, TIMESTAMP_FORMAT, TIMESTAMP_LEN};
pub use version_key::{validate_revision, VersionKey};
