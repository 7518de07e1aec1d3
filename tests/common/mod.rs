//! Shared test utilities for integration test suites.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use swstack::{StackConfig, StackManager, StackSchema, Timestamp};
use tempfile::TempDir;

/// A temp directory holding one versionless file name and its manager.
pub struct TestStack {
    pub dir: TempDir,
    pub file: PathBuf,
    pub manager: StackManager,
}

impl TestStack {
    /// Nothing on disk yet; call `manager.create` or `write`.
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join(name);
        TestStack {
            dir,
            file,
            manager: StackManager::new(&StackConfig::default()).unwrap(),
        }
    }

    /// Write a stack document body for this file.
    pub fn write(&self, body: &str) -> PathBuf {
        let paths = self.manager.paths(&self.file).unwrap();
        paths.create_directories().unwrap();
        fs::write(paths.document(), body).unwrap();
        paths.document().to_path_buf()
    }

    pub fn open(&self) -> Box<dyn StackSchema> {
        self.manager.resolve(&self.file).unwrap()
    }

    pub fn document(&self) -> PathBuf {
        self.manager.paths(&self.file).unwrap().document().to_path_buf()
    }

    pub fn contents(&self) -> String {
        fs::read_to_string(self.document()).unwrap()
    }
}

/// Parse a wire timestamp.
pub fn ts(text: &str) -> Timestamp {
    Timestamp::parse(text).unwrap()
}

/// `base` plus `secs` seconds.
pub fn ts_plus(base: &str, secs: i64) -> Timestamp {
    ts(base).checked_add_secs(secs).unwrap()
}
