//! Stack schema engines
//!
//! Each on-disk encoding is a separate engine implementing [`StackSchema`]:
//!
//! - [`Schema1Stack`]: append-ordered entries, one flagged `is_current`
//! - [`Schema2Stack`]: newest-first log of install/rollback actions
//!
//! The engine is picked once per open by the
//! [`SchemaRegistry`](crate::registry::SchemaRegistry). Capabilities a schema
//! lacks (schema 1 has no version counter) surface as
//! [`StackError::Unsupported`] from that engine, not from shared defaults.
//!
//! Every engine follows the same mutation discipline: build the new entry
//! list on a copy, hand it to the [`PersistenceGuard`], and only adopt it
//! once the save succeeded. A failed call leaves the engine untouched.
//!
//! Engines keep the raw element of every entry next to its decoded form and
//! only touch the attributes an operation changes, so attributes they do
//! not model survive a save.

mod schema1;
mod schema2;

pub use schema1::{Schema1Entry, Schema1Stack};
pub use schema2::{Schema2Entry, Schema2Stack};

use std::fmt;
use std::path::Path;
use swstack_core::{
    FileMetadata, InstallRequest, Result, SchemaId, StackError, StackPaths, StackVersion,
    Timestamp,
};
use swstack_durability::{Element, PersistenceGuard, StackDocument};
use tracing::debug;

/// Operations offered by every stack schema
pub trait StackSchema: fmt::Debug {
    /// Identifier of the schema this engine implements
    fn schema_id(&self) -> SchemaId;

    /// Paths of the tracked file and its stack document
    fn paths(&self) -> &StackPaths;

    /// Metadata of the current entry
    fn current(&self) -> Result<FileMetadata>;

    /// Version of the current entry
    fn current_version(&self) -> Result<StackVersion>;

    /// Version number the next install will receive
    fn next_version(&self) -> Result<u32>;

    /// Metadata of the entry with the given version
    fn version(&self, version: &StackVersion) -> Result<FileMetadata>;

    /// Metadata of the entry that was current at `instant`
    fn file_on(&self, instant: Timestamp) -> Result<FileMetadata>;

    /// Record a new install and make it current
    fn insert(&mut self, request: InstallRequest) -> Result<FileMetadata>;

    /// Make the previous version current
    fn rollback(&mut self, instant: Option<Timestamp>) -> Result<FileMetadata>;

    /// Undo a rollback
    fn rollforward(&mut self, instant: Option<Timestamp>) -> Result<()>;

    /// Every entry in document order
    fn entries(&self) -> Result<Vec<FileMetadata>>;

    /// Whether `metadata` describes the current entry
    fn is_current(&self, metadata: &FileMetadata) -> Result<bool> {
        Ok(self.current()? == *metadata)
    }
}

/// Constructor stored in the registry
///
/// Receives the parsed document, its guard and the schema identifier the
/// document declares (after defaulting).
pub type SchemaConstructor =
    fn(StackDocument, PersistenceGuard, &SchemaId) -> Result<Box<dyn StackSchema>>;

// =============================================================================
// Shared engine state
// =============================================================================

/// Root element, paths and guard of one open document
#[derive(Debug)]
pub(crate) struct StackBinding {
    paths: StackPaths,
    root: StackDocument,
    guard: PersistenceGuard,
}

impl StackBinding {
    /// Bind to a document after checking it declares `expected`
    ///
    /// Versioned artifact paths follow the root's `path` attribute; a
    /// document without one falls back to the file it was loaded from.
    pub(crate) fn bind(
        document: &StackDocument,
        guard: PersistenceGuard,
        expected: &str,
        declared: &SchemaId,
    ) -> Result<Self> {
        if declared.as_str() != expected {
            return Err(StackError::SchemaMismatch {
                expected: expected.to_string(),
                found: declared.to_string(),
            });
        }

        let paths = match document.path.as_deref() {
            Some(path) => StackPaths::from_document(Path::new(path))?,
            None => StackPaths::from_document(guard.path())?,
        };

        debug!(
            path = %guard.path().display(),
            schema = %declared,
            entries = document.elements.len(),
            "Bound stack engine"
        );

        Ok(StackBinding {
            paths,
            root: document.with_elements(Vec::new()),
            guard,
        })
    }

    pub(crate) fn paths(&self) -> &StackPaths {
        &self.paths
    }

    /// Save the document with a replacement entry list
    pub(crate) fn persist(&mut self, elements: &[Element]) -> Result<()> {
        self.guard.save(&self.root.with_elements(elements.to_vec()))
    }
}

/// Fetch a required attribute of entry `index`
pub(crate) fn required<'a>(element: &'a Element, index: usize, name: &str) -> Result<&'a str> {
    element
        .get(name)
        .ok_or_else(|| StackError::malformed_entry(index, format!("missing '{}' attribute", name)))
}
