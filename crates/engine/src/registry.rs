//! Schema registry for stack dispatch
//!
//! Maps the `schema` attribute of a stack document to the engine that
//! understands it. Documents written before schemas were tagged carry no
//! attribute and resolve to the registry's default.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut registry = SchemaRegistry::new();
//! registry.register(SchemaId::v1(), Schema1Stack::boxed);
//! registry.set_default(SchemaId::v1());
//!
//! let engine = registry.construct(document, guard)?;
//! ```

use crate::schema::{Schema1Stack, Schema2Stack, SchemaConstructor, StackSchema};
use std::collections::HashMap;
use std::fmt;
use swstack_core::{Result, SchemaId, StackError};
use swstack_durability::{PersistenceGuard, StackDocument};
use tracing::debug;

/// Registry of stack schema engines
pub struct SchemaRegistry {
    /// Constructors by schema identifier
    constructors: HashMap<SchemaId, SchemaConstructor>,
    /// Schema assumed when a document carries no `schema` attribute
    default_schema: Option<SchemaId>,
}

impl SchemaRegistry {
    /// Create a new empty registry with no default
    pub fn new() -> Self {
        SchemaRegistry {
            constructors: HashMap::new(),
            default_schema: None,
        }
    }

    /// Registry with schemas 1 and 2, defaulting to 1
    pub fn with_builtin_schemas() -> Self {
        let mut registry = SchemaRegistry::new();
        registry.register(SchemaId::v1(), Schema1Stack::boxed);
        registry.register(SchemaId::v2(), Schema2Stack::boxed);
        registry.set_default(SchemaId::v1());
        registry
    }

    /// Register an engine; replaces any engine already under `schema`
    pub fn register(&mut self, schema: SchemaId, constructor: SchemaConstructor) {
        debug!(schema = %schema, "Registered stack schema");
        self.constructors.insert(schema, constructor);
    }

    /// Set the schema for documents without a `schema` attribute
    pub fn set_default(&mut self, schema: SchemaId) {
        self.default_schema = Some(schema);
    }

    /// Remove the default
    pub fn clear_default(&mut self) {
        self.default_schema = None;
    }

    /// Schema assumed for untagged documents
    pub fn default_schema(&self) -> Option<&SchemaId> {
        self.default_schema.as_ref()
    }

    /// Get constructor by schema identifier
    pub fn get(&self, schema: &SchemaId) -> Option<SchemaConstructor> {
        self.constructors.get(schema).copied()
    }

    /// Check if a schema is registered
    pub fn is_registered(&self, schema: &SchemaId) -> bool {
        self.constructors.contains_key(schema)
    }

    /// Registered identifiers, sorted
    pub fn schema_ids(&self) -> Vec<SchemaId> {
        let mut ids: Vec<_> = self.constructors.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Schema a document resolves to
    ///
    /// The declared attribute wins; an untagged document takes the default.
    pub fn resolve_schema(&self, document: &StackDocument) -> Result<SchemaId> {
        let schema = match (&document.schema, &self.default_schema) {
            (Some(declared), _) => SchemaId::new(declared.as_str()),
            (None, Some(default)) => default.clone(),
            (None, None) => return Err(StackError::MissingSchemaAttribute),
        };

        if !self.is_registered(&schema) {
            return Err(StackError::UnknownSchema {
                schema: schema.to_string(),
                registered: self.schema_ids().iter().map(SchemaId::to_string).collect(),
            });
        }
        Ok(schema)
    }

    /// Build the engine for a parsed document
    pub fn construct(
        &self,
        document: StackDocument,
        guard: PersistenceGuard,
    ) -> Result<Box<dyn StackSchema>> {
        let schema = self.resolve_schema(&document)?;
        let constructor = self.get(&schema).ok_or_else(|| StackError::UnknownSchema {
            schema: schema.to_string(),
            registered: self.schema_ids().iter().map(SchemaId::to_string).collect(),
        })?;
        debug!(schema = %schema, path = %guard.path().display(), "Dispatching stack document");
        constructor(document, guard, &schema)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::with_builtin_schemas()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.schema_ids())
            .field("default_schema", &self.default_schema)
            .finish()
    }
}
