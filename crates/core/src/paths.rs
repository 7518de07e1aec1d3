//! Stack document path convention
//!
//! A versionless file and its history live side by side:
//!
//! ```text
//! <dir>/
//! ├── <name>                              # versionless file
//! └── bak/
//!     └── <name>/
//!         ├── <name>_swinstall_stack      # stack document
//!         ├── <name>_20181105-103813      # schema 1 artifact
//!         └── <name>_3                    # schema 2 artifact
//! ```

use crate::error::{Result, StackError};
use std::path::{Path, PathBuf};

/// Default name of the backup directory next to the versionless file
pub const DEFAULT_BAK_DIR: &str = "bak";

/// Default suffix appended to the file name to form the stack document name
pub const DEFAULT_STACK_SUFFIX: &str = "_swinstall_stack";

/// Naming convention for stack documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLayout {
    bak_dir: String,
    stack_suffix: String,
}

impl Default for StackLayout {
    fn default() -> Self {
        StackLayout {
            bak_dir: DEFAULT_BAK_DIR.to_string(),
            stack_suffix: DEFAULT_STACK_SUFFIX.to_string(),
        }
    }
}

impl StackLayout {
    /// Layout with a custom backup directory and document suffix
    pub fn new(bak_dir: impl Into<String>, stack_suffix: impl Into<String>) -> Self {
        StackLayout {
            bak_dir: bak_dir.into(),
            stack_suffix: stack_suffix.into(),
        }
    }

    /// Paths for a versionless file under this layout
    pub fn paths_for(&self, versionless_file: &Path) -> Result<StackPaths> {
        let name = file_name(versionless_file)?;
        let dir = versionless_file.parent().unwrap_or(Path::new(""));
        let stack_dir = dir.join(&self.bak_dir).join(&name);
        let document = stack_dir.join(format!("{}{}", name, self.stack_suffix));
        Ok(StackPaths {
            versionless: versionless_file.to_path_buf(),
            stack_dir,
            document,
            name,
        })
    }
}

/// Paths belonging to one tracked file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackPaths {
    versionless: PathBuf,
    stack_dir: PathBuf,
    document: PathBuf,
    name: String,
}

impl StackPaths {
    /// Recover paths from a stack document location
    ///
    /// The versionless name is the name of the directory holding the
    /// document, and the versionless file sits two levels above it.
    pub fn from_document(document: &Path) -> Result<Self> {
        let stack_dir = document.parent().unwrap_or(Path::new("")).to_path_buf();
        let name = file_name(&stack_dir)?;
        let versionless = stack_dir
            .parent()
            .and_then(Path::parent)
            .map(|dir| dir.join(&name))
            .unwrap_or_else(|| PathBuf::from(&name));
        Ok(StackPaths {
            versionless,
            stack_dir,
            document: document.to_path_buf(),
            name,
        })
    }

    /// The stack document
    pub fn document(&self) -> &Path {
        &self.document
    }

    /// Directory holding the document and versioned artifacts
    pub fn stack_dir(&self) -> &Path {
        &self.stack_dir
    }

    /// The versionless file
    pub fn versionless_file(&self) -> &Path {
        &self.versionless
    }

    /// Base name of the versionless file
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the versioned artifact `<name>_<suffix>`
    pub fn versioned_file(&self, suffix: impl std::fmt::Display) -> PathBuf {
        self.stack_dir.join(format!("{}_{}", self.name, suffix))
    }

    /// Check if the stack document exists
    pub fn exists(&self) -> bool {
        self.document.exists()
    }

    /// Create the stack directory
    pub fn create_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.stack_dir)
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            StackError::invalid_input(format!("no usable file name in '{}'", path.display()))
        })
}
