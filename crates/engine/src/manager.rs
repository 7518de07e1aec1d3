//! Stack manager: path convention plus schema dispatch
//!
//! Callers name the versionless file; the manager finds its stack document,
//! parses it, and hands back the engine for the document's schema with a
//! [`PersistenceGuard`] armed at the instant the open started.

use crate::config::StackConfig;
use crate::registry::SchemaRegistry;
use crate::schema::StackSchema;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use swstack_core::{Result, SchemaId, StackError, StackLayout, StackPaths, SCHEMA_V1};
use swstack_durability::{create_document, PersistenceGuard, StackDocument, WriteOptions};
use tracing::{debug, info};

/// Opens and creates stacks
#[derive(Debug)]
pub struct StackManager {
    registry: SchemaRegistry,
    layout: StackLayout,
    write_options: WriteOptions,
}

impl StackManager {
    /// Manager with the built-in schemas, configured by `config`
    pub fn new(config: &StackConfig) -> Result<Self> {
        config.validate()?;
        let mut registry = SchemaRegistry::with_builtin_schemas();
        match config.default_schema_id() {
            Some(schema) if !registry.is_registered(&schema) => {
                return Err(StackError::Config(format!(
                    "default_schema '{}' is not a registered schema",
                    schema
                )));
            }
            Some(schema) => registry.set_default(schema),
            None => registry.clear_default(),
        }
        Ok(Self::with_registry(
            registry,
            config.layout(),
            config.write_options(),
        ))
    }

    /// Manager over a custom registry
    pub fn with_registry(
        registry: SchemaRegistry,
        layout: StackLayout,
        write_options: WriteOptions,
    ) -> Self {
        StackManager {
            registry,
            layout,
            write_options,
        }
    }

    /// The schema registry
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Stack paths for a versionless file
    pub fn paths(&self, versionless_file: &Path) -> Result<StackPaths> {
        self.layout.paths_for(versionless_file)
    }

    /// Open the stack of `versionless_file`
    ///
    /// The open timestamp is taken before the document is read, so a write
    /// that lands during parsing still fails the next save.
    pub fn resolve(&self, versionless_file: &Path) -> Result<Box<dyn StackSchema>> {
        let opened_at = SystemTime::now();
        self.resolve_at(versionless_file, opened_at)
    }

    /// Open the stack of `versionless_file` with an explicit open timestamp
    pub fn resolve_at(
        &self,
        versionless_file: &Path,
        opened_at: SystemTime,
    ) -> Result<Box<dyn StackSchema>> {
        let paths = self.paths(versionless_file)?;
        self.open_document(paths.document(), opened_at)
    }

    /// Open a stack document by its own path
    pub fn open_document(
        &self,
        document_path: &Path,
        opened_at: SystemTime,
    ) -> Result<Box<dyn StackSchema>> {
        let document = StackDocument::load(document_path)?;
        let guard = PersistenceGuard::new(document_path, opened_at, self.write_options);
        self.registry.construct(document, guard)
    }

    /// Create an empty stack for `versionless_file` and open it
    ///
    /// The schema attribute is left out only when the schema is "1" and
    /// "1" is also the default, matching documents written before the
    /// attribute existed.
    pub fn create(
        &self,
        versionless_file: &Path,
        schema: &SchemaId,
    ) -> Result<Box<dyn StackSchema>> {
        if !self.registry.is_registered(schema) {
            return Err(StackError::UnknownSchema {
                schema: schema.to_string(),
                registered: self
                    .registry
                    .schema_ids()
                    .iter()
                    .map(SchemaId::to_string)
                    .collect(),
            });
        }

        let paths = self.paths(&absolute(versionless_file)?)?;
        let omit_schema =
            schema.as_str() == SCHEMA_V1 && self.registry.default_schema() == Some(schema);
        let document = StackDocument::new(
            paths.document().to_string_lossy(),
            (!omit_schema).then(|| schema.to_string()),
        );

        debug!(path = %paths.document().display(), schema = %schema, "Creating stack");
        create_document(paths.document(), &document, self.write_options)?;
        info!(file = %paths.versionless_file().display(), schema = %schema, "Created stack");

        self.resolve(paths.versionless_file())
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
