//! Output stores for icon container files.
//!
//! A container is a text file holding many icon records. Two forms exist:
//!
//! - [`ModuleStore`]: a module of exported objects plus a manifest export
//! - [`SpriteStore`]: an SVG sprite of `<symbol>` elements
//!
//! Both implement [`IconStore`], which works on in-memory text: every
//! mutation takes the current content and returns the new content, touching
//! only the entry it targets. [`OutputFile`] binds a store to a path and
//! handles locking and atomic writes.
//!
//! # Example
//!
//! ```
//! use icon_forge::IconRecord;
//! use icon_forge::store::{IconStore, ModuleStore, UpsertKind};
//!
//! let store = ModuleStore::new();
//! let content = store.create(&IconRecord::new("home", "<path/>"));
//!
//! let result = store.upsert(&content, &IconRecord::new("star", "<circle/>")).unwrap();
//! assert_eq!(result.kind, UpsertKind::Inserted);
//! assert_eq!(store.list_names(&result.content), vec!["home", "star"]);
//! ```

pub mod file;
mod literal;
pub mod module;
mod scan;
pub mod sprite;

pub use file::OutputFile;
pub use module::{DEFAULT_MANIFEST_NAME, ModuleStore};
pub use sprite::SpriteStore;

use tracing::{debug, warn};

use crate::error::Result;
use crate::icon::{IconRecord, IconSet};

// ============================================================================
// Upsert result
// ============================================================================

/// What an upsert did to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpsertKind {
    /// The content was blank and a new container was generated.
    Created,
    /// A new entry was added and registered.
    Inserted,
    /// An existing entry was replaced in place.
    Replaced,
    /// No manifest or root element was found. The entry was appended but is
    /// not registered.
    AppendedWithoutManifest,
}

/// New container content plus the kind of change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upsert {
    pub content: String,
    pub kind: UpsertKind,
}

impl Upsert {
    pub fn new(content: String, kind: UpsertKind) -> Self {
        Self { content, kind }
    }

    /// True if the entry was written but could not be registered.
    pub fn is_degraded(&self) -> bool {
        self.kind == UpsertKind::AppendedWithoutManifest
    }
}

// ============================================================================
// IconStore trait
// ============================================================================

/// Structure-preserving edits on container text.
///
/// Implementations never rewrite entries they do not target. Mutations on
/// content that is already broken fail with
/// [`Error::Malformed`](crate::Error::Malformed); read-only queries log a
/// warning and report nothing instead.
pub trait IconStore {
    /// Generates a new container holding one record.
    fn create(&self, record: &IconRecord) -> String;

    /// Adds `record`, or replaces the entry with the same key.
    fn upsert(&self, content: &str, record: &IconRecord) -> Result<Upsert>;

    /// Removes the entry named `name`. Absent entries leave `content`
    /// unchanged.
    fn remove(&self, content: &str, name: &str) -> Result<String>;

    /// Reads every entry back.
    fn records(&self, content: &str) -> Result<IconSet>;

    fn exists(&self, content: &str, name: &str) -> bool;

    /// Entry names in container order.
    fn list_names(&self, content: &str) -> Vec<String> {
        match self.records(content) {
            Ok(set) => set.names(),
            Err(err) => {
                warn!(%err, "cannot list entries of malformed container");
                Vec::new()
            }
        }
    }

    fn count(&self, content: &str) -> usize {
        self.list_names(content).len()
    }

    /// Replaces the entry `old_name` with `record`.
    ///
    /// Both edits are applied to the in-memory text, so the caller commits
    /// a single result.
    fn rename(&self, content: &str, old_name: &str, record: &IconRecord) -> Result<Upsert> {
        if old_name == record.name {
            return self.upsert(content, record);
        }
        debug!(from = %old_name, to = %record.name, "renaming entry");
        let removed = self.remove(content, old_name)?;
        self.upsert(&removed, record)
    }
}

// ============================================================================
// OutputStore
// ============================================================================

/// Either container form, chosen at runtime from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputStore {
    Module(ModuleStore),
    Sprite(SpriteStore),
}

impl Default for OutputStore {
    fn default() -> Self {
        Self::Module(ModuleStore::default())
    }
}

impl From<ModuleStore> for OutputStore {
    fn from(store: ModuleStore) -> Self {
        Self::Module(store)
    }
}

impl From<SpriteStore> for OutputStore {
    fn from(store: SpriteStore) -> Self {
        Self::Sprite(store)
    }
}

impl OutputStore {
    fn inner(&self) -> &dyn IconStore {
        match self {
            Self::Module(store) => store,
            Self::Sprite(store) => store,
        }
    }
}

impl IconStore for OutputStore {
    fn create(&self, record: &IconRecord) -> String {
        self.inner().create(record)
    }

    fn upsert(&self, content: &str, record: &IconRecord) -> Result<Upsert> {
        self.inner().upsert(content, record)
    }

    fn remove(&self, content: &str, name: &str) -> Result<String> {
        self.inner().remove(content, name)
    }

    fn records(&self, content: &str) -> Result<IconSet> {
        self.inner().records(content)
    }

    fn exists(&self, content: &str, name: &str) -> bool {
        self.inner().exists(content, name)
    }

    fn list_names(&self, content: &str) -> Vec<String> {
        self.inner().list_names(content)
    }

    fn rename(&self, content: &str, old_name: &str, record: &IconRecord) -> Result<Upsert> {
        self.inner().rename(content, old_name, record)
    }
}
