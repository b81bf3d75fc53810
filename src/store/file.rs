//! A container file on disk.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::{IconStore, OutputStore, Upsert};
use crate::error::{Error, Result};
use crate::icon::{IconRecord, IconSet};

/// Binds an [`OutputStore`] to a path.
///
/// Each mutation is one locked read-modify-write cycle, and the new content
/// replaces the file atomically. Share one `OutputFile` per path (for
/// example behind an `Arc`) so concurrent writers serialize on its lock.
#[derive(Debug)]
pub struct OutputFile {
    path: PathBuf,
    store: OutputStore,
    lock: Mutex<()>,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>, store: impl Into<OutputStore>) -> Self {
        Self {
            path: path.into(),
            store: store.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    /// Reads the current content.
    pub fn read(&self) -> Result<String> {
        let _guard = self.guard();
        self.read_unlocked()
    }

    /// Adds or replaces a record, creating the file if it does not exist.
    pub fn upsert(&self, record: &IconRecord) -> Result<Upsert> {
        let _guard = self.guard();
        let content = self.read_or_empty()?;
        let result = self.store.upsert(&content, record)?;
        self.commit(&content, &result.content)?;
        Ok(result)
    }

    /// Removes a record. Returns false, leaving the file untouched, when no
    /// entry has that name.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let _guard = self.guard();
        let content = self.read_unlocked()?;
        let updated = self.store.remove(&content, name)?;
        if updated == content {
            return Ok(false);
        }
        self.commit(&content, &updated)?;
        Ok(true)
    }

    /// Renames a record with a single write.
    pub fn rename(&self, old_name: &str, record: &IconRecord) -> Result<Upsert> {
        let _guard = self.guard();
        let content = self.read_or_empty()?;
        let result = self.store.rename(&content, old_name, record)?;
        self.commit(&content, &result.content)?;
        Ok(result)
    }

    pub fn records(&self) -> Result<IconSet> {
        let content = self.read()?;
        self.store.records(&content)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.query(|content| self.store.exists(content, name))
            .unwrap_or(false)
    }

    pub fn list_names(&self) -> Vec<String> {
        self.query(|content| self.store.list_names(content))
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.list_names().len()
    }

    fn query<T>(&self, f: impl FnOnce(&str) -> T) -> Option<T> {
        match self.read() {
            Ok(content) => Some(f(&content)),
            Err(Error::FileNotFound(_)) => None,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "cannot read output file");
                None
            }
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_unlocked(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(Error::FileNotFound(self.path.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn read_or_empty(&self) -> Result<String> {
        match self.read_unlocked() {
            Err(Error::FileNotFound(_)) => Ok(String::new()),
            other => other,
        }
    }

    fn commit(&self, before: &str, after: &str) -> Result<()> {
        if before == after {
            debug!(path = %self.path.display(), "content unchanged, skipping write");
            return Ok(());
        }
        write_atomic(&self.path, after)?;
        info!(path = %self.path.display(), bytes = after.len(), "wrote output file");
        Ok(())
    }
}

/// Writes `contents` to a temporary file beside `path` and renames it over
/// the target.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ModuleStore, SpriteStore, UpsertKind};
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn module_file(dir: &TempDir) -> OutputFile {
        OutputFile::new(dir.path().join("icons.ts"), ModuleStore::new())
    }

    #[test]
    fn upsert_creates_missing_file() {
        init_tracing();
        let dir = TempDir::new().unwrap();
        let file = OutputFile::new(dir.path().join("nested/out/icons.ts"), ModuleStore::new());
        let result = file.upsert(&IconRecord::new("home", "<path/>")).unwrap();
        assert_eq!(result.kind, UpsertKind::Created);
        assert_eq!(file.read().unwrap(), result.content);
        assert_eq!(file.list_names(), vec!["home"]);
    }

    #[test]
    fn read_and_remove_report_missing_file() {
        let dir = TempDir::new().unwrap();
        let file = module_file(&dir);
        assert!(matches!(file.read(), Err(Error::FileNotFound(_))));
        assert!(matches!(file.remove("home"), Err(Error::FileNotFound(_))));
        assert!(!file.exists("home"));
        assert_eq!(file.count(), 0);
    }

    #[test]
    fn remove_absent_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let file = module_file(&dir);
        file.upsert(&IconRecord::new("home", "<path/>")).unwrap();
        let before = file.read().unwrap();

        assert!(!file.remove("star").unwrap());
        assert_eq!(file.read().unwrap(), before);

        assert!(file.remove("home").unwrap());
        assert_eq!(file.count(), 0);
    }

    #[test]
    fn rename_moves_entry_on_disk() {
        let dir = TempDir::new().unwrap();
        let file = OutputFile::new(dir.path().join("sprite.svg"), SpriteStore::new());
        file.upsert(&IconRecord::new("home", "<path/>")).unwrap();
        file.upsert(&IconRecord::new("star", "<circle/>")).unwrap();

        file.rename("home", &IconRecord::new("house", "<path/>")).unwrap();
        assert_eq!(file.list_names(), vec!["star", "house"]);
        assert!(file.exists("house"));
        assert!(!file.exists("home"));
    }

    #[test]
    fn concurrent_upserts_are_serialized() {
        init_tracing();
        let dir = TempDir::new().unwrap();
        let file = Arc::new(module_file(&dir));
        file.upsert(&IconRecord::new("seed", "<path/>")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let file = Arc::clone(&file);
                thread::spawn(move || {
                    file.upsert(&IconRecord::new(format!("icon-{i}"), "<path/>"))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut names = file.list_names();
        names.sort();
        let mut expected: Vec<_> = (0..8).map(|i| format!("icon-{i}")).collect();
        expected.push("seed".to_string());
        expected.sort();
        assert_eq!(names, expected);
    }

    #[test]
    fn write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }
}
