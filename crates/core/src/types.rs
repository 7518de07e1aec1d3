//! Operation parameter types
//!
//! - [`Action`]: what a schema 2 entry records
//! - [`StackVersion`]: a version as each schema understands it
//! - [`InstallRequest`]: parameters of an install

use crate::contract::{Timestamp, VersionKey};
use crate::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Action recorded by a schema 2 entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// A new version was installed
    Install,
    /// An earlier version was made current again
    Rollback,
}

impl Action {
    /// Attribute value of this action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Install => "install",
            Action::Rollback => "rollback",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Action {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "install" => Ok(Action::Install),
            "rollback" => Ok(Action::Rollback),
            other => Err(StackError::format(other, "expected install or rollback")),
        }
    }
}

/// Version identifier of an entry
///
/// Schema 1 identifies entries by install time, schema 2 by an integer
/// counter. Versions are only meaningful to the schema that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum StackVersion {
    /// Schema 1 version key
    Key(VersionKey),
    /// Schema 2 version number
    Number(u32),
}

impl StackVersion {
    /// Schema 1 key without a revision
    pub fn timestamp(timestamp: Timestamp) -> Self {
        StackVersion::Key(VersionKey::from_timestamp(timestamp))
    }
}

impl fmt::Display for StackVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackVersion::Key(key) => write!(f, "{}", key),
            StackVersion::Number(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for StackVersion {
    type Err = StackError;

    /// All-digit text is a version number, anything else a version key
    fn from_str(s: &str) -> Result<Self> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            let n = s
                .parse::<u32>()
                .map_err(|e| StackError::format(s, e.to_string()))?;
            return Ok(StackVersion::Number(n));
        }
        VersionKey::parse(s).map(StackVersion::Key)
    }
}

/// Parameters of an install
///
/// Schema 2 requires `hash`; schema 1 records only time and revision.
/// A missing `timestamp` means "now".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRequest {
    /// Hash of the installed content
    pub hash: Option<String>,
    /// Install time
    pub timestamp: Option<Timestamp>,
    /// Optional VCS revision
    pub revision: Option<String>,
}

impl InstallRequest {
    /// Request with a content hash
    pub fn with_hash(hash: impl Into<String>) -> Self {
        InstallRequest {
            hash: Some(hash.into()),
            ..Default::default()
        }
    }

    /// Request pinned to an install time
    pub fn at(timestamp: Timestamp) -> Self {
        InstallRequest {
            timestamp: Some(timestamp),
            ..Default::default()
        }
    }

    /// Set the install time
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the revision
    pub fn revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }
}
