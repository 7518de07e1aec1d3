//! Stack engines for swinstall version histories
//!
//! This crate ties the lower layers together:
//! - Schema engines: query and mutate one stack document per schema
//! - SchemaRegistry: dispatch a parsed document to its engine
//! - StackManager: path convention, open timestamps and stack creation
//! - StackConfig: `swstack.toml` settings
//!
//! Engines never hold a document open between calls. Every mutation is
//! saved before it is returned, and a save that detects a concurrent writer
//! leaves both the file and the engine unchanged.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod manager;
pub mod registry;
pub mod schema;

pub use config::{StackConfig, CONFIG_FILE_NAME};
pub use manager::StackManager;
pub use registry::SchemaRegistry;
pub use schema::{
    Schema1Entry, Schema1Stack, Schema2Entry, Schema2Stack, SchemaConstructor, StackSchema,
};
