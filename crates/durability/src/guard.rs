//! Optimistic-concurrency save protocol
//!
//! A [`PersistenceGuard`] remembers the instant its stack was opened. On save
//! it compares the backing file's modification time against that instant: a
//! later mtime means another process wrote the document in the meantime, so
//! the save is refused and the in-memory mutation is dropped. Nothing is
//! locked, merged or retried.
//!
//! Writes go through write-fsync-rename so a crash never leaves a truncated
//! document behind.

use crate::document::StackDocument;
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use swstack_core::{Result, StackError};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Default XML indentation width
pub const DEFAULT_INDENT: usize = 3;

/// How documents are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per indentation level
    pub indent: usize,
    /// fsync the temp file and directory around the rename
    pub sync: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            indent: DEFAULT_INDENT,
            sync: true,
        }
    }
}

/// Save-time modification check for one open stack document
#[derive(Debug, Clone)]
pub struct PersistenceGuard {
    path: PathBuf,
    opened_at: SystemTime,
    options: WriteOptions,
}

impl PersistenceGuard {
    /// Guard a document opened at `opened_at`
    pub fn new(path: impl Into<PathBuf>, opened_at: SystemTime, options: WriteOptions) -> Self {
        PersistenceGuard {
            path: path.into(),
            opened_at,
            options,
        }
    }

    /// Guard a document opened now
    pub fn open_now(path: impl Into<PathBuf>, options: WriteOptions) -> Self {
        PersistenceGuard::new(path, SystemTime::now(), options)
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Instant the document was opened (or last saved by this guard)
    pub fn opened_at(&self) -> SystemTime {
        self.opened_at
    }

    /// Write options
    pub fn options(&self) -> WriteOptions {
        self.options
    }

    /// Fail if the backing file changed after the open timestamp
    pub fn check(&self) -> Result<()> {
        let modified = fs::metadata(&self.path)?.modified()?;
        if modified > self.opened_at {
            warn!(
                path = %self.path.display(),
                modified = %format_instant(modified),
                opened = %format_instant(self.opened_at),
                "Stack document modified since open"
            );
            return Err(StackError::ConcurrentModification {
                path: self.path.clone(),
                modified: format_instant(modified),
                opened: format_instant(self.opened_at),
            });
        }
        Ok(())
    }

    /// Check for concurrent modification, then rewrite the whole document
    ///
    /// On success the open timestamp moves to the new file's modification
    /// time, so a later save from this guard only fails if someone else
    /// wrote in between.
    pub fn save(&mut self, document: &StackDocument) -> Result<()> {
        self.check()?;
        let bytes = document.to_xml(self.options.indent)?;
        write_atomic(&self.path, &bytes, self.options.sync)?;
        self.opened_at = fs::metadata(&self.path)?.modified()?;
        info!(
            path = %self.path.display(),
            entries = document.elements.len(),
            bytes = bytes.len(),
            "Saved stack document"
        );
        Ok(())
    }
}

/// Write a brand-new document, refusing to overwrite an existing one
pub fn create_document(path: &Path, document: &StackDocument, options: WriteOptions) -> Result<()> {
    if path.exists() {
        return Err(StackError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = document.to_xml(options.indent)?;
    write_atomic(path, &bytes, options.sync)?;
    info!(path = %path.display(), "Created stack document");
    Ok(())
}

/// Atomic write: unique temp + (fsync) + rename
///
/// The temp file lives next to `path` so the rename stays on one
/// filesystem. It takes over the permissions of the file it replaces.
fn write_atomic(path: &Path, bytes: &[u8], sync: bool) -> io::Result<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent)?;
    debug!(path = %temp.path().display(), "Writing temp document");
    temp.write_all(bytes)?;
    if let Ok(existing) = fs::metadata(path) {
        fs::set_permissions(temp.path(), existing.permissions())?;
    }
    if sync {
        temp.as_file().sync_all()?;
    }
    temp.persist(path).map_err(|e| e.error)?;

    // Sync parent directory
    if sync {
        File::open(parent)?.sync_all()?;
    }
    Ok(())
}

fn format_instant(instant: SystemTime) -> String {
    DateTime::<Local>::from(instant)
        .format("%Y%m%d-%H%M%S%.6f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Element;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    fn write_stack(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("f_swinstall_stack");
        let doc = StackDocument::new(path.to_string_lossy(), Some("2".into()));
        create_document(&path, &doc, WriteOptions::default()).unwrap();
        path
    }

    fn sample_doc(path: &Path) -> StackDocument {
        let mut doc = StackDocument::new(path.to_string_lossy(), Some("2".into()));
        doc.elements.push(Element::new().with("version", "1"));
        doc
    }

    #[test]
    fn test_save_after_open() {
        let dir = TempDir::new().unwrap();
        let path = write_stack(&dir);
        let mut guard = PersistenceGuard::open_now(&path, WriteOptions::default());

        guard.save(&sample_doc(&path)).unwrap();

        let reloaded = StackDocument::load(&path).unwrap();
        assert_eq!(reloaded.elements.len(), 1);
    }

    #[test]
    fn test_save_refused_when_modified_after_open() {
        let dir = TempDir::new().unwrap();
        let path = write_stack(&dir);
        let before = fs::read(&path).unwrap();
        let mut guard = PersistenceGuard::new(&path, UNIX_EPOCH, WriteOptions::default());

        let err = guard.save(&sample_doc(&path)).unwrap_err();

        assert!(matches!(err, StackError::ConcurrentModification { .. }));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_consecutive_saves_rebaseline() {
        let dir = TempDir::new().unwrap();
        let path = write_stack(&dir);
        let mut guard = PersistenceGuard::open_now(&path, WriteOptions::default());

        guard.save(&sample_doc(&path)).unwrap();
        guard.save(&sample_doc(&path)).unwrap();

        assert_eq!(guard.opened_at(), fs::metadata(&path).unwrap().modified().unwrap());
    }

    #[test]
    fn test_foreign_write_between_saves_detected() {
        let dir = TempDir::new().unwrap();
        let path = write_stack(&dir);
        let mut guard = PersistenceGuard::open_now(&path, WriteOptions::default());
        guard.save(&sample_doc(&path)).unwrap();

        // Pretend the last save happened well before the file's current mtime
        guard.opened_at = guard.opened_at - Duration::from_secs(60);

        assert!(matches!(
            guard.check(),
            Err(StackError::ConcurrentModification { .. })
        ));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = write_stack(&dir);
        let mut guard = PersistenceGuard::open_now(&path, WriteOptions::default());
        guard.save(&sample_doc(&path)).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_create_refuses_existing() {
        let dir = TempDir::new().unwrap();
        let path = write_stack(&dir);
        let doc = StackDocument::new(path.to_string_lossy(), None);

        let err = create_document(&path, &doc, WriteOptions::default()).unwrap_err();
        assert!(matches!(err, StackError::AlreadyExists(_)));
    }

    #[test]
    fn test_save_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent");
        let mut guard = PersistenceGuard::open_now(&path, WriteOptions::default());

        let err = guard.save(&sample_doc(&path)).unwrap_err();
        assert!(matches!(err, StackError::Io(_)));
    }

    #[test]
    fn test_save_does_not_reuse_a_fixed_temp_name() {
        let dir = TempDir::new().unwrap();
        let path = write_stack(&dir);
        let mut foreign = path.as_os_str().to_owned();
        foreign.push(".tmp");
        fs::write(&foreign, "another writer").unwrap();

        let mut guard = PersistenceGuard::open_now(&path, WriteOptions::default());
        guard.save(&sample_doc(&path)).unwrap();

        assert_eq!(fs::read_to_string(&foreign).unwrap(), "another writer");
        assert!(fs::read_to_string(&path).unwrap().contains("<stack_history"));
    }
}
