//! Persistence layer for swinstall stacks
//!
//! This crate owns everything that touches the stack document on disk:
//! - StackDocument: the in-memory mirror of one `<stack_history>` file
//! - XML codec: parse and render the document with `quick-xml`
//! - PersistenceGuard: open-timestamp check plus atomic whole-file rewrite

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod guard;
pub mod xml;

pub use document::{
    Element, StackDocument, ENTRY_ELEMENT, PATH_ATTRIBUTE, ROOT_ELEMENT, SCHEMA_ATTRIBUTE,
};
pub use guard::{create_document, PersistenceGuard, WriteOptions, DEFAULT_INDENT};
