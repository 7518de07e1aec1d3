//! Error types for swinstall stacks
//!
//! Every failure surfaced by the codec, the stack engines, the registry and
//! the persistence guard is a variant of [`StackError`]. We use `thiserror`
//! for the `Display` and `Error` implementations.
//!
//! Variants fall into a small number of classes (see [`ErrorKind`]) so that
//! callers can tell "nothing to roll back to" apart from "no such version"
//! without matching on every variant.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stack operations
pub type Result<T> = std::result::Result<T, StackError>;

/// Error taxonomy class of a [`StackError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed timestamp, version string, entry or XML
    Format,
    /// Requested version or instant does not exist
    Lookup,
    /// Rollback past the oldest entry
    Underflow,
    /// Unknown, missing or mismatched schema identifier
    Schema,
    /// Backing file changed since it was opened
    Concurrency,
    /// Operation not offered by this schema
    Unsupported,
    /// Caller supplied an argument the operation cannot accept
    InvalidInput,
    /// Filesystem failure
    Io,
}

/// Error types for stack operations
#[derive(Debug, Error)]
pub enum StackError {
    /// I/O error while reading or writing a stack document
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed timestamp or version string
    #[error("Invalid format '{input}': {reason}")]
    Format {
        /// Offending text
        input: String,
        /// What was wrong with it
        reason: String,
    },

    /// Stack document is not well-formed XML
    #[error("Malformed stack document: {0}")]
    Xml(String),

    /// An entry element is missing an attribute or carries a bad value
    #[error("Malformed entry {index}: {reason}")]
    MalformedEntry {
        /// Position of the entry in document order
        index: usize,
        /// What was wrong with it
        reason: String,
    },

    /// No entry is flagged as current
    #[error("Unable to find current version")]
    NoCurrentVersion,

    /// The stack has no entries
    #[error("Stack has no entries")]
    EmptyStack,

    /// No entry carries the requested version
    #[error("No version {0} has been published")]
    VersionNotFound(String),

    /// No entry was current on or before the requested instant
    #[error("No version installed on or before {0}")]
    NoMatchingVersion(String),

    /// Rollback requested from the oldest entry
    #[error("Attempt to roll back before the first version")]
    RollbackUnderflow,

    /// Next version cannot be derived (no install entries)
    #[error("Unable to find next version: stack has no install entries")]
    NextVersionUnresolvable,

    /// Operation is not offered by this schema
    #[error("Operation '{operation}' is not supported by schema {schema}")]
    Unsupported {
        /// Operation name
        operation: &'static str,
        /// Schema identifier
        schema: String,
    },

    /// No engine registered for the declared schema
    #[error("Schema registry missing schema version: {schema}. Registered versions: {registered:?}")]
    UnknownSchema {
        /// Declared schema identifier
        schema: String,
        /// Identifiers known to the registry
        registered: Vec<String>,
    },

    /// Document declares no schema and the registry has no default
    #[error("Root element does not have a schema attribute")]
    MissingSchemaAttribute,

    /// Engine constructed against a document of another schema
    #[error("Wrong schema version {found} for engine of schema {expected}")]
    SchemaMismatch {
        /// Schema the engine implements
        expected: String,
        /// Schema declared by the document
        found: String,
    },

    /// Backing file was modified after the stack was opened
    #[error("{path} modification time {modified} later than edit start time {opened}")]
    ConcurrentModification {
        /// Stack document path
        path: PathBuf,
        /// Modification time observed at save
        modified: String,
        /// Open timestamp of this engine
        opened: String,
    },

    /// Stack document already exists
    #[error("Stack document already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Invalid argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StackError {
    /// Build a format error for `input`
    pub fn format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        StackError::Format {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Build a malformed-entry error
    pub fn malformed_entry(index: usize, reason: impl Into<String>) -> Self {
        StackError::MalformedEntry {
            index,
            reason: reason.into(),
        }
    }

    /// Build an unsupported-operation error
    pub fn unsupported(operation: &'static str, schema: impl Into<String>) -> Self {
        StackError::Unsupported {
            operation,
            schema: schema.into(),
        }
    }

    /// Build an invalid-input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        StackError::InvalidInput(reason.into())
    }

    /// Taxonomy class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StackError::Io(_) => ErrorKind::Io,
            StackError::Format { .. } | StackError::Xml(_) | StackError::MalformedEntry { .. } => {
                ErrorKind::Format
            }
            StackError::NoCurrentVersion
            | StackError::EmptyStack
            | StackError::VersionNotFound(_)
            | StackError::NoMatchingVersion(_)
            | StackError::NextVersionUnresolvable => ErrorKind::Lookup,
            StackError::RollbackUnderflow => ErrorKind::Underflow,
            StackError::UnknownSchema { .. }
            | StackError::MissingSchemaAttribute
            | StackError::SchemaMismatch { .. } => ErrorKind::Schema,
            StackError::ConcurrentModification { .. } => ErrorKind::Concurrency,
            StackError::Unsupported { .. } => ErrorKind::Unsupported,
            StackError::AlreadyExists(_) | StackError::InvalidInput(_) | StackError::Config(_) => {
                ErrorKind::InvalidInput
            }
        }
    }

    /// True for lookup failures the caller may recover from
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::Lookup
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_format() {
        let err = StackError::format("2018-01-01", "expected YYYYMMDD-HHMMSS");
        let msg = err.to_string();
        assert!(msg.contains("2018-01-01"));
        assert!(msg.contains("YYYYMMDD-HHMMSS"));
    }

    #[test]
    fn test_error_display_unknown_schema() {
        let err = StackError::UnknownSchema {
            schema: "7".to_string(),
            registered: vec!["1".to_string(), "2".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("missing schema version: 7"));
        assert!(msg.contains("\"2\""));
    }

    #[test]
    fn test_error_display_concurrent_modification() {
        let err = StackError::ConcurrentModification {
            path: PathBuf::from("/tmp/bak/a/a_swinstall_stack"),
            modified: "20181110-104603".to_string(),
            opened: "20181110-104500".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("a_swinstall_stack"));
        assert!(msg.contains("later than edit start time"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: StackError = io_err.into();
        assert!(matches!(err, StackError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(StackError::RollbackUnderflow.kind(), ErrorKind::Underflow);
        assert_eq!(StackError::EmptyStack.kind(), ErrorKind::Lookup);
        assert_eq!(StackError::MissingSchemaAttribute.kind(), ErrorKind::Schema);
        assert_eq!(
            StackError::unsupported("next_version", "1").kind(),
            ErrorKind::Unsupported
        );
        assert_eq!(
            StackError::malformed_entry(3, "missing version").kind(),
            ErrorKind::Format
        );
    }

    #[test]
    fn test_underflow_is_not_a_lookup_failure() {
        assert!(!StackError::RollbackUnderflow.is_not_found());
        assert!(StackError::VersionNotFound("4".to_string()).is_not_found());
        assert!(StackError::NoMatchingVersion("20180101-000000".to_string()).is_not_found());
    }
}
