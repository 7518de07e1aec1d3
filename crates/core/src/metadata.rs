//! Resolved-version metadata
//!
//! Every query against a stack returns a freshly built [`FileMetadata`]
//! describing one entry: where its versioned artifact lives plus the
//! schema-specific fields. Values are never mutated after construction and
//! compare structurally over every field.

use crate::contract::{Timestamp, VersionKey};
use crate::types::{Action, StackVersion};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Metadata of a schema 1 entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Schema1Metadata {
    /// Path to the versioned artifact
    pub path: PathBuf,
    /// Whether the entry carries the current flag
    pub is_current: bool,
    /// Install time and revision
    pub version: VersionKey,
}

/// Metadata of a schema 2 entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Schema2Metadata {
    /// Path to the versioned artifact
    pub path: PathBuf,
    /// Install or rollback
    pub action: Action,
    /// Version number (shared by a rollback and the install it targets)
    pub version: u32,
    /// When the action happened
    pub timestamp: Timestamp,
    /// Hash of the artifact contents
    pub hash: String,
    /// Optional VCS revision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

/// Metadata of one resolved entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "schema")]
pub enum FileMetadata {
    /// Entry of a schema 1 stack
    #[serde(rename = "1")]
    Schema1(Schema1Metadata),
    /// Entry of a schema 2 stack
    #[serde(rename = "2")]
    Schema2(Schema2Metadata),
}

impl FileMetadata {
    /// Path to the versioned artifact
    pub fn path(&self) -> &Path {
        match self {
            FileMetadata::Schema1(m) => &m.path,
            FileMetadata::Schema2(m) => &m.path,
        }
    }

    /// Time the entry was written
    pub fn timestamp(&self) -> Timestamp {
        match self {
            FileMetadata::Schema1(m) => m.version.timestamp,
            FileMetadata::Schema2(m) => m.timestamp,
        }
    }

    /// VCS revision, if recorded
    pub fn revision(&self) -> Option<&str> {
        match self {
            FileMetadata::Schema1(m) => m.version.revision.as_deref(),
            FileMetadata::Schema2(m) => m.revision.as_deref(),
        }
    }

    /// Version of the entry in its schema's terms
    pub fn version(&self) -> StackVersion {
        match self {
            FileMetadata::Schema1(m) => StackVersion::Key(m.version.clone()),
            FileMetadata::Schema2(m) => StackVersion::Number(m.version),
        }
    }

    /// Schema 1 fields, if this is a schema 1 entry
    pub fn as_schema1(&self) -> Option<&Schema1Metadata> {
        match self {
            FileMetadata::Schema1(m) => Some(m),
            FileMetadata::Schema2(_) => None,
        }
    }

    /// Schema 2 fields, if this is a schema 2 entry
    pub fn as_schema2(&self) -> Option<&Schema2Metadata> {
        match self {
            FileMetadata::Schema2(m) => Some(m),
            FileMetadata::Schema1(_) => None,
        }
    }
}

impl fmt::Display for FileMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileMetadata::Schema1(m) => write!(
                f,
                "FileMetadata <path: {} is_current: {} version: {}>",
                m.path.display(),
                m.is_current,
                m.version
            ),
            FileMetadata::Schema2(m) => {
                write!(
                    f,
                    "FileMetadata <path: {} action: {} version: {} datetime: {} hash: {}",
                    m.path.display(),
                    m.action,
                    m.version,
                    m.timestamp,
                    m.hash
                )?;
                if let Some(rev) = &m.revision {
                    write!(f, " revision: {}", rev)?;
                }
                write!(f, ">")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema2(version: u32, action: Action) -> FileMetadata {
        FileMetadata::Schema2(Schema2Metadata {
            path: PathBuf::from(format!("/d/bak/f/f_{}", version)),
            action,
            version,
            timestamp: Timestamp::parse("20181110-104603").unwrap(),
            hash: "abc".to_string(),
            revision: None,
        })
    }

    #[test]
    fn test_equality_is_structural() {
        assert_eq!(schema2(1, Action::Install), schema2(1, Action::Install));
        assert_ne!(schema2(1, Action::Install), schema2(1, Action::Rollback));
        assert_ne!(schema2(1, Action::Install), schema2(2, Action::Install));
    }

    #[test]
    fn test_accessors() {
        let meta = FileMetadata::Schema1(Schema1Metadata {
            path: PathBuf::from("/d/bak/f/f_20161213-093146_r575055"),
            is_current: false,
            version: VersionKey::parse("20161213-093146_r575055").unwrap(),
        });
        assert_eq!(meta.revision(), Some("r575055"));
        assert_eq!(meta.timestamp().to_string(), "20161213-093146");
        assert!(meta.as_schema2().is_none());
        assert!(meta.to_string().contains("is_current: false"));
    }

    #[test]
    fn test_version_accessor() {
        assert_eq!(schema2(3, Action::Install).version(), StackVersion::Number(3));
    }
}
