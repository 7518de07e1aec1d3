//! Schema 1: current-flag list
//!
//! ```text
//! <stack_history path="...">
//!     <elt is_current="False" version="20161213-093146_r575055"/>
//!     <elt is_current="True" version="20181105-103813"/>
//!     <elt is_current="False" version="20181110-104603"/>
//! </stack_history>
//! ```
//!
//! Entries are appended oldest-first and never removed. At most one entry
//! carries `is_current="True"`; rollback moves that flag one entry towards
//! the head of the document. Entries after the flagged one are rolled-back
//! history and never answer a point-in-time query.

use super::{required, StackBinding, StackSchema};
use swstack_core::{
    FileMetadata, InstallRequest, Result, Schema1Metadata, SchemaId, StackError, StackPaths,
    StackVersion, Timestamp, VersionKey, SCHEMA_V1,
};
use swstack_durability::{Element, PersistenceGuard, StackDocument};
use tracing::debug;

const IS_CURRENT: &str = "is_current";
const VERSION: &str = "version";
const TRUE: &str = "True";
const FALSE: &str = "False";

/// One decoded schema 1 entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema1Entry {
    /// Whether this entry is current
    pub is_current: bool,
    /// Install time and revision
    pub key: VersionKey,
}

impl Schema1Entry {
    /// Decode entry `index`
    ///
    /// Any `is_current` value other than `True` reads as not current.
    pub fn decode(index: usize, element: &Element) -> Result<Self> {
        let key = VersionKey::parse(required(element, index, VERSION)?)
            .map_err(|e| StackError::malformed_entry(index, e.to_string()))?;
        Ok(Schema1Entry {
            is_current: element.get(IS_CURRENT) == Some(TRUE),
            key,
        })
    }

    /// Encode as an element
    pub fn encode(&self) -> Element {
        Element::new()
            .with(IS_CURRENT, if self.is_current { TRUE } else { FALSE })
            .with(VERSION, self.key.to_string())
    }
}

/// Engine over a schema 1 document
#[derive(Debug)]
pub struct Schema1Stack {
    binding: StackBinding,
    entries: Vec<Schema1Entry>,
    elements: Vec<Element>,
}

impl Schema1Stack {
    /// Decode the document and bind it to its guard
    pub fn open(
        document: StackDocument,
        guard: PersistenceGuard,
        declared: &SchemaId,
    ) -> Result<Self> {
        let binding = StackBinding::bind(&document, guard, SCHEMA_V1, declared)?;
        let entries = document
            .elements
            .iter()
            .enumerate()
            .map(|(i, e)| Schema1Entry::decode(i, e))
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema1Stack {
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
        Ok(Box::new(Schema1Stack::open(document, guard, declared)?))
    }

    /// Decoded entries, oldest first
    pub fn raw_entries(&self) -> &[Schema1Entry] {
        &self.entries
    }

    fn metadata(&self, entry: &Schema1Entry) -> FileMetadata {
        FileMetadata::Schema1(Schema1Metadata {
            path: self.binding.paths().versioned_file(&entry.key),
            is_current: entry.is_current,
            version: entry.key.clone(),
        })
    }

    fn current_index(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.is_current)
    }

    /// Metadata of the flagged entry
    pub fn current(&self) -> Result<FileMetadata> {
        self.current_index()
            .map(|i| self.metadata(&self.entries[i]))
            .ok_or(StackError::NoCurrentVersion)
    }

    /// Version key of the flagged entry
    pub fn current_version(&self) -> Result<VersionKey> {
        self.current_index()
            .map(|i| self.entries[i].key.clone())
            .ok_or(StackError::NoCurrentVersion)
    }

    /// Entry installed at exactly `timestamp`
    pub fn version(&self, timestamp: Timestamp) -> Result<FileMetadata> {
        self.entries
            .iter()
            .find(|e| e.key.timestamp == timestamp)
            .map(|e| self.metadata(e))
            .ok_or_else(|| StackError::VersionNotFound(timestamp.to_string()))
    }

    /// Latest entry installed on or before `instant`, never past the current one
    pub fn file_on(&self, instant: Timestamp) -> Result<FileMetadata> {
        let not_found = || StackError::NoMatchingVersion(instant.to_string());
        let mut latest: Option<&Schema1Entry> = None;

        for entry in &self.entries {
            if entry.key.timestamp > instant {
                return latest.map(|e| self.metadata(e)).ok_or_else(not_found);
            }
            latest = Some(entry);
            if entry.is_current {
                break;
            }
        }

        latest.map(|e| self.metadata(e)).ok_or_else(not_found)
    }

    /// Append a new current entry
    ///
    /// Any flagged entry loses its flag; nothing is truncated.
    pub fn insert(&mut self, timestamp: Timestamp, revision: Option<String>) -> Result<FileMetadata> {
        let key = VersionKey::new(timestamp, revision)?;
        debug!(version = %key, "Inserting schema 1 entry");

        let mut entries = self.entries.clone();
        let mut elements = self.elements.clone();
        for (entry, element) in entries.iter_mut().zip(elements.iter_mut()) {
            if entry.is_current {
                entry.is_current = false;
                element.set(IS_CURRENT, FALSE);
            }
        }
        let entry = Schema1Entry {
            is_current: true,
            key,
        };
        elements.push(entry.encode());
        entries.push(entry);

        self.commit(entries, elements)?;
        self.current()
    }

    /// Move the current flag to the preceding entry
    pub fn rollback(&mut self) -> Result<FileMetadata> {
        let index = self.current_index().ok_or(StackError::NoCurrentVersion)?;
        if index == 0 {
            return Err(StackError::RollbackUnderflow);
        }
        debug!(
            from = %self.entries[index].key,
            to = %self.entries[index - 1].key,
            "Rolling back schema 1 entry"
        );

        let mut entries = self.entries.clone();
        let mut elements = self.elements.clone();
        entries[index].is_current = false;
        elements[index].set(IS_CURRENT, FALSE);
        entries[index - 1].is_current = true;
        elements[index - 1].set(IS_CURRENT, TRUE);

        self.commit(entries, elements)?;
        self.current()
    }

    fn commit(&mut self, entries: Vec<Schema1Entry>, elements: Vec<Element>) -> Result<()> {
        self.binding.persist(&elements)?;
        self.entries = entries;
        self.elements = elements;
        Ok(())
    }
}

impl StackSchema for Schema1Stack {
    fn schema_id(&self) -> SchemaId {
        SchemaId::v1()
    }

    fn paths(&self) -> &StackPaths {
        self.binding.paths()
    }

    fn current(&self) -> Result<FileMetadata> {
        Schema1Stack::current(self)
    }

    fn current_version(&self) -> Result<StackVersion> {
        Schema1Stack::current_version(self).map(StackVersion::Key)
    }

    fn next_version(&self) -> Result<u32> {
        Err(StackError::unsupported("next_version", SCHEMA_V1))
    }

    fn version(&self, version: &StackVersion) -> Result<FileMetadata> {
        match version {
            StackVersion::Key(key) => Schema1Stack::version(self, key.timestamp),
            StackVersion::Number(n) => Err(StackError::invalid_input(format!(
                "schema 1 versions are timestamps, got number {}",
                n
            ))),
        }
    }

    fn file_on(&self, instant: Timestamp) -> Result<FileMetadata> {
        Schema1Stack::file_on(self, instant)
    }

    fn insert(&mut self, request: InstallRequest) -> Result<FileMetadata> {
        if request.hash.is_some() {
            debug!("Schema 1 does not record content hashes; ignoring hash");
        }
        let timestamp = request.timestamp.unwrap_or_else(Timestamp::now);
        Schema1Stack::insert(self, timestamp, request.revision)
    }

    fn rollback(&mut self, _instant: Option<Timestamp>) -> Result<FileMetadata> {
        Schema1Stack::rollback(self)
    }

    fn rollforward(&mut self, _instant: Option<Timestamp>) -> Result<()> {
        Err(StackError::unsupported("rollforward", SCHEMA_V1))
    }

    fn entries(&self) -> Result<Vec<FileMetadata>> {
        Ok(self.entries.iter().map(|e| self.metadata(e)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entry() {
        let elt = Element::new()
            .with("is_current", "True")
            .with("version", "20161213-093146_r575055");
        let entry = Schema1Entry::decode(0, &elt).unwrap();
        assert!(entry.is_current);
        assert_eq!(entry.key.revision.as_deref(), Some("r575055"));
        assert_eq!(entry.encode(), elt);
    }

    #[test]
    fn test_decode_non_true_flag_is_not_current() {
        let elt = Element::new()
            .with("is_current", "true")
            .with("version", "20181105-103813");
        assert!(!Schema1Entry::decode(0, &elt).unwrap().is_current);
    }

    #[test]
    fn test_decode_missing_version() {
        let err = Schema1Entry::decode(4, &Element::new().with("is_current", "True")).unwrap_err();
        assert!(matches!(err, StackError::MalformedEntry { index: 4, .. }));
    }

    #[test]
    fn test_decode_bad_version() {
        let elt = Element::new().with("version", "2018-11-05");
        let err = Schema1Entry::decode(1, &elt).unwrap_err();
        assert!(matches!(err, StackError::MalformedEntry { index: 1, .. }));
    }
}
