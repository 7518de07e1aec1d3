//! Composite version key of schema 1 entries
//!
//! A schema 1 entry is identified by the timestamp it was installed at plus
//! an optional VCS revision, serialized together as
//! `YYYYMMDD-HHMMSS[_REVISION]`.

use super::timestamp::{Timestamp, REVISION_SEPARATOR};
use crate::error::{Result, StackError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Timestamp plus optional revision
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersionKey {
    /// Install time
    pub timestamp: Timestamp,
    /// Optional VCS revision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

impl VersionKey {
    /// Create a key, validating the revision token
    ///
    /// A revision must be non-empty and must not contain the separator,
    /// otherwise the key could not be parsed back.
    pub fn new(timestamp: Timestamp, revision: Option<String>) -> Result<Self> {
        if let Some(rev) = revision.as_deref() {
            validate_revision(rev)?;
        }
        Ok(VersionKey {
            timestamp,
            revision,
        })
    }

    /// Key without a revision
    pub fn from_timestamp(timestamp: Timestamp) -> Self {
        VersionKey {
            timestamp,
            revision: None,
        }
    }

    /// Parse `YYYYMMDD-HHMMSS[_REVISION]`
    pub fn parse(text: &str) -> Result<Self> {
        let (timestamp, revision) = Timestamp::parse_with_revision(text)?;
        Ok(VersionKey {
            timestamp,
            revision,
        })
    }
}

/// Check that a revision token can be embedded in a version key
pub fn validate_revision(revision: &str) -> Result<()> {
    if revision.is_empty() {
        return Err(StackError::invalid_input("revision must not be empty"));
    }
    if revision.contains(REVISION_SEPARATOR) {
        return Err(StackError::invalid_input(format!(
            "revision '{}' must not contain '{}'",
            revision, REVISION_SEPARATOR
        )));
    }
    Ok(())
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(rev) => write!(f, "{}{}{}", self.timestamp, REVISION_SEPARATOR, rev),
            None => write!(f, "{}", self.timestamp),
        }
    }
}

impl FromStr for VersionKey {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        VersionKey::parse(s)
    }
}
