//! Schema 2: prepend log
//!
//! ```text
//! <stack_history path="..." schema="2">
//!    <elt action="rollback" version="2" datetime="20181112-090000" hash="b2"/>
//!    <elt action="install" version="3" datetime="20181111-090000" hash="c3"/>
//!    <elt action="install" version="2" datetime="20181110-090000" hash="b2"/>
//!    <elt action="install" version="1" datetime="20181109-090000" hash="a1"/>
//! </stack_history>
//! ```
//!
//! Every install or rollback prepends one entry, so the first entry is always
//! current and entries are in descending time order. A new entry dated
//! before the head is refused. A rollback entry reuses the version number of
//! the install it restores; version numbers only ever advance from install
//! entries.

use super::{required, StackBinding, StackSchema};
use swstack_core::{
    Action, FileMetadata, InstallRequest, Result, Schema2Metadata, SchemaId, StackError,
    StackPaths, StackVersion, Timestamp, SCHEMA_V2,
};
use swstack_durability::{Element, PersistenceGuard, StackDocument};
use tracing::{debug, warn};

const ACTION: &str = "action";
const VERSION: &str = "version";
const DATETIME: &str = "datetime";
const HASH: &str = "hash";
const REVISION: &str = "revision";

/// One decoded schema 2 entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema2Entry {
    /// Install or rollback
    pub action: Action,
    /// Version number, starting at 1
    pub version: u32,
    /// When the action happened
    pub timestamp: Timestamp,
    /// Hash of the artifact contents
    pub hash: String,
    /// Optional VCS revision
    pub revision: Option<String>,
}

impl Schema2Entry {
    /// Decode entry `index`
    pub fn decode(index: usize, element: &Element) -> Result<Self> {
        let malformed = |e: StackError| StackError::malformed_entry(index, e.to_string());

        let action = required(element, index, ACTION)?
            .parse::<Action>()
            .map_err(malformed)?;
        let version_text = required(element, index, VERSION)?;
        let version = version_text
            .parse::<u32>()
            .ok()
            .filter(|v| *v >= 1)
            .ok_or_else(|| {
                StackError::malformed_entry(
                    index,
                    format!("version '{}' is not a positive integer", version_text),
                )
            })?;
        let timestamp = Timestamp::parse(required(element, index, DATETIME)?).map_err(malformed)?;
        let hash = required(element, index, HASH)?.to_string();
        let revision = element
            .get(REVISION)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        Ok(Schema2Entry {
            action,
            version,
            timestamp,
            hash,
            revision,
        })
    }

    /// Encode as an element; an absent revision writes no attribute
    pub fn encode(&self) -> Element {
        let element = Element::new()
            .with(ACTION, self.action.as_str())
            .with(VERSION, self.version.to_string())
            .with(DATETIME, self.timestamp.to_string())
            .with(HASH, self.hash.as_str());
        match &self.revision {
            Some(rev) => element.with(REVISION, rev.as_str()),
            None => element,
        }
    }
}

/// Engine over a schema 2 document
#[derive(Debug)]
pub struct Schema2Stack {
    binding: StackBinding,
    entries: Vec<Schema2Entry>,
    elements: Vec<Element>,
}

impl Schema2Stack {
    /// Decode the document and bind it to its guard
    pub fn open(
        document: StackDocument,
        guard: PersistenceGuard,
        declared: &SchemaId,
    ) -> Result<Self> {
        let binding = StackBinding::bind(&document, guard, SCHEMA_V2, declared)?;
        let entries = document
            .elements
            .iter()
            .enumerate()
            .map(|(i, e)| Schema2Entry::decode(i, e))
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema2Stack {
            binding,
            entries,
            elements: document.elements,
        })
    }

    /// Registry constructor
    pub fn boxed(
        document: StackDocument,
        guard: PersistenceGuard,
        declared: &SchemaId,
    ) -> Result<Box<dyn StackSchema>> {
        Ok(Box::new(Schema2Stack::open(document, guard, declared)?))
    }

    /// Decoded entries, newest first
    pub fn raw_entries(&self) -> &[Schema2Entry] {
        &self.entries
    }

    fn metadata(&self, entry: &Schema2Entry) -> FileMetadata {
        FileMetadata::Schema2(Schema2Metadata {
            path: self.binding.paths().versioned_file(entry.version),
            action: entry.action,
            version: entry.version,
            timestamp: entry.timestamp,
            hash: entry.hash.clone(),
            revision: entry.revision.clone(),
        })
    }

    fn head(&self) -> Result<&Schema2Entry> {
        self.entries.first().ok_or(StackError::EmptyStack)
    }

    /// Metadata of the first entry
    pub fn current(&self) -> Result<FileMetadata> {
        self.head().map(|e| self.metadata(e))
    }

    /// Version number of the first entry
    pub fn current_version(&self) -> Result<u32> {
        self.head().map(|e| e.version)
    }

    /// One past the newest install's version; 1 for an empty stack
    pub fn next_version(&self) -> Result<u32> {
        if self.entries.is_empty() {
            debug!("No entries in stack, next version is 1");
            return Ok(1);
        }
        self.entries
            .iter()
            .find(|e| e.action == Action::Install)
            .and_then(|e| e.version.checked_add(1))
            .ok_or(StackError::NextVersionUnresolvable)
    }

    /// Newest entry carrying `version`
    ///
    /// A rollback entry shadows the install it restored.
    pub fn version(&self, version: u32) -> Result<FileMetadata> {
        self.find_version(version).map(|e| self.metadata(e))
    }

    fn find_version(&self, version: u32) -> Result<&Schema2Entry> {
        self.entries
            .iter()
            .find(|e| e.version == version)
            .ok_or_else(|| StackError::VersionNotFound(version.to_string()))
    }

    /// Newest entry written on or before `instant`
    pub fn file_on(&self, instant: Timestamp) -> Result<FileMetadata> {
        self.entries
            .iter()
            .find(|e| e.timestamp <= instant)
            .map(|e| self.metadata(e))
            .ok_or_else(|| StackError::NoMatchingVersion(instant.to_string()))
    }

    /// Prepend an install entry with the next version number
    pub fn insert(
        &mut self,
        hash: &str,
        timestamp: Option<Timestamp>,
        revision: Option<String>,
    ) -> Result<FileMetadata> {
        if hash.is_empty() {
            return Err(StackError::invalid_input("content hash must not be empty"));
        }
        if revision.as_deref() == Some("") {
            return Err(StackError::invalid_input("revision must not be empty"));
        }

        let entry = Schema2Entry {
            action: Action::Install,
            version: self.next_version()?,
            timestamp: timestamp.unwrap_or_else(Timestamp::now),
            hash: hash.to_string(),
            revision,
        };
        debug!(version = entry.version, datetime = %entry.timestamp, "Inserting schema 2 entry");
        self.prepend(entry)
    }

    /// Prepend a rollback entry restoring the previous version
    pub fn rollback(&mut self, timestamp: Option<Timestamp>) -> Result<FileMetadata> {
        let target_version = self
            .current_version()?
            .checked_sub(1)
            .filter(|v| *v >= 1)
            .ok_or(StackError::RollbackUnderflow)?;
        let target = self.find_version(target_version)?;

        let entry = Schema2Entry {
            action: Action::Rollback,
            version: target_version,
            timestamp: timestamp.unwrap_or_else(Timestamp::now),
            hash: target.hash.clone(),
            revision: target.revision.clone(),
        };
        debug!(version = entry.version, datetime = %entry.timestamp, "Rolling back schema 2 entry");
        self.prepend(entry)
    }

    /// Entries must stay in descending time order; a timestamp equal to the
    /// head's is accepted.
    fn prepend(&mut self, entry: Schema2Entry) -> Result<FileMetadata> {
        if let Some(head) = self.entries.first() {
            if entry.timestamp < head.timestamp {
                warn!(
                    datetime = %entry.timestamp,
                    head = %head.timestamp,
                    "Refusing entry older than the current head"
                );
                return Err(StackError::invalid_input(format!(
                    "datetime {} is older than the current entry ({})",
                    entry.timestamp, head.timestamp
                )));
            }
        }

        let mut elements = Vec::with_capacity(self.elements.len() + 1);
        elements.push(entry.encode());
        elements.extend(self.elements.iter().cloned());

        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(entry);
        entries.extend(self.entries.iter().cloned());

        self.binding.persist(&elements)?;
        self.entries = entries;
        self.elements = elements;
        self.current()
    }
}

impl StackSchema for Schema2Stack {
    fn schema_id(&self) -> SchemaId {
        SchemaId::v2()
    }

    fn paths(&self) -> &StackPaths {
        self.binding.paths()
    }

    fn current(&self) -> Result<FileMetadata> {
        Schema2Stack::current(self)
    }

    fn current_version(&self) -> Result<StackVersion> {
        Schema2Stack::current_version(self).map(StackVersion::Number)
    }

    fn next_version(&self) -> Result<u32> {
        Schema2Stack::next_version(self)
    }

    fn version(&self, version: &StackVersion) -> Result<FileMetadata> {
        match version {
            StackVersion::Number(n) => Schema2Stack::version(self, *n),
            StackVersion::Key(key) => Err(StackError::invalid_input(format!(
                "schema 2 versions are numbers, got {}",
                key
            ))),
        }
    }

    fn file_on(&self, instant: Timestamp) -> Result<FileMetadata> {
        Schema2Stack::file_on(self, instant)
    }

    fn insert(&mut self, request: InstallRequest) -> Result<FileMetadata> {
        let hash = request
            .hash
            .ok_or_else(|| StackError::invalid_input("schema 2 installs require a content hash"))?;
        Schema2Stack::insert(self, &hash, request.timestamp, request.revision)
    }

    fn rollback(&mut self, instant: Option<Timestamp>) -> Result<FileMetadata> {
        Schema2Stack::rollback(self, instant)
    }

    /// Not implemented by this schema: a no-op that writes nothing
    fn rollforward(&mut self, _instant: Option<Timestamp>) -> Result<()> {
        debug!("rollforward is a no-op for schema 2");
        Ok(())
    }

    fn entries(&self) -> Result<Vec<FileMetadata>> {
        Ok(self.entries.iter().map(|e| self.metadata(e)).collect())
    }
}
