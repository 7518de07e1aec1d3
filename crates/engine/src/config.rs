//! Stack configuration via `swstack.toml`
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! classic swinstall layout: `bak/<name>/<name>_swinstall_stack`, untagged
//! documents read as schema 1, three-space indentation, synced writes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use swstack_core::{
    Result, SchemaId, StackError, StackLayout, DEFAULT_BAK_DIR, DEFAULT_STACK_SUFFIX, SCHEMA_V1,
};
use swstack_durability::{WriteOptions, DEFAULT_INDENT};

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "swstack.toml";

/// Stack configuration loaded from `swstack.toml`.
///
/// # Example
///
/// ```toml
/// # Schema assumed for documents without a schema attribute ("" = none)
/// default_schema = "1"
/// bak_dir = "bak"
/// stack_suffix = "_swinstall_stack"
/// indent = 3
/// sync = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Schema for untagged documents; empty means untagged documents are rejected.
    #[serde(default = "default_schema_str")]
    pub default_schema: String,
    /// Backup directory created next to the versionless file.
    #[serde(default = "default_bak_dir")]
    pub bak_dir: String,
    /// Suffix appended to the file name to name the stack document.
    #[serde(default = "default_stack_suffix")]
    pub stack_suffix: String,
    /// Spaces per XML indentation level.
    #[serde(default = "default_indent")]
    pub indent: usize,
    /// fsync documents on save.
    #[serde(default = "default_sync")]
    pub sync: bool,
}

fn default_schema_str() -> String {
    SCHEMA_V1.to_string()
}

fn default_bak_dir() -> String {
    DEFAULT_BAK_DIR.to_string()
}

fn default_stack_suffix() -> String {
    DEFAULT_STACK_SUFFIX.to_string()
}

fn default_indent() -> usize {
    DEFAULT_INDENT
}

fn default_sync() -> bool {
    true
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            default_schema: default_schema_str(),
            bak_dir: default_bak_dir(),
            stack_suffix: default_stack_suffix(),
            indent: default_indent(),
            sync: default_sync(),
        }
    }
}

impl StackConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# swinstall stack configuration
#
# Schema assumed for stack documents without a schema attribute.
# Set to "" to reject untagged documents instead.
default_schema = "1"

# Backup directory created next to each versionless file
bak_dir = "bak"

# Suffix appended to the file name to name its stack document
stack_suffix = "_swinstall_stack"

# Spaces per indentation level when writing documents
indent = 3

# fsync documents and their directory on save (default: true)
sync = true
"#
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or fails validation.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: StackConfig = toml::from_str(text)
            .map_err(|e| StackError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StackError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            StackError::Config(reason) => {
                StackError::Config(format!("{} ({})", reason, path.display()))
            }
            other => other,
        })
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values that would produce unusable paths.
    pub fn validate(&self) -> Result<()> {
        if self.bak_dir.is_empty() || self.bak_dir.contains(['/', '\\']) {
            return Err(StackError::Config(format!(
                "bak_dir '{}' must be a single non-empty path component",
                self.bak_dir
            )));
        }
        if self.stack_suffix.is_empty() || self.stack_suffix.contains(['/', '\\']) {
            return Err(StackError::Config(format!(
                "stack_suffix '{}' must be non-empty and contain no separators",
                self.stack_suffix
            )));
        }
        if self.indent > 16 {
            return Err(StackError::Config(format!(
                "indent {} is out of range (0-16)",
                self.indent
            )));
        }
        Ok(())
    }

    /// Schema for untagged documents, if any.
    pub fn default_schema_id(&self) -> Option<SchemaId> {
        let schema = self.default_schema.trim();
        (!schema.is_empty()).then(|| SchemaId::new(schema))
    }

    /// Path naming convention.
    pub fn layout(&self) -> StackLayout {
        StackLayout::new(self.bak_dir.as_str(), self.stack_suffix.as_str())
    }

    /// Document write options.
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            indent: self.indent,
            sync: self.sync,
        }
    }
}
