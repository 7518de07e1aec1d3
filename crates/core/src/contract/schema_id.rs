//! Schema identifier
//!
//! The `schema` attribute on a stack document's root element selects the
//! on-disk encoding. Documents written before the attribute existed carry
//! none and are read as schema "1".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the current-flag encoding
pub const SCHEMA_V1: &str = "1";

/// Identifier of the prepend-log encoding
pub const SCHEMA_V2: &str = "2";

/// Schema identifier string tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(String);

impl SchemaId {
    /// Wrap an identifier
    pub fn new(id: impl Into<String>) -> Self {
        SchemaId(id.into())
    }

    /// Schema "1"
    pub fn v1() -> Self {
        SchemaId::new(SCHEMA_V1)
    }

    /// Schema "2"
    pub fn v2() -> Self {
        SchemaId::new(SCHEMA_V2)
    }

    /// Identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemaId {
    fn from(id: &str) -> Self {
        SchemaId::new(id)
    }
}

impl From<String> for SchemaId {
    fn from(id: String) -> Self {
        SchemaId(id)
    }
}
