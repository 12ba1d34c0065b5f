//! The declaration store: where raw class-like declarations come from.
//!
//! The reflection engine only ever reads from a store. Stores may parse files
//! lazily and are therefore asynchronous; an unknown name is not an error and
//! yields an empty candidate list.

use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::base::{FileId, TypeKey};
use super::decl::ClassDecl;

/// Failure of the store itself. The engine forwards these unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {file}: {message}")]
    Parse { file: FileId, message: String },
    #[error("declaration store unavailable: {0}")]
    Unavailable(String),
}

/// Supplies raw declarations by class-like name.
///
/// Several candidates may exist for one name (duplicate definitions); their
/// order is up to the store and the engine uses the first.
pub trait DeclarationStore: Send + Sync {
    fn get_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Arc<ClassDecl>>, StoreError>>;
}

impl<S: DeclarationStore + ?Sized> DeclarationStore for Arc<S> {
    fn get_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Arc<ClassDecl>>, StoreError>> {
        (**self).get_by_name(name)
    }
}

/// In-memory store of parsed declarations, replaced file by file.
///
/// Candidates for a name are returned in file insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    /// FileId → declarations of that file, in file order
    by_file: IndexMap<FileId, Vec<Arc<ClassDecl>>>,
    /// TypeKey → (file, declaration) candidates
    by_name: FxHashMap<TypeKey, Vec<(FileId, Arc<ClassDecl>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding the given declarations in a single file.
    pub fn from_decls(decls: impl IntoIterator<Item = ClassDecl>) -> Self {
        let store = Self::new();
        store.set_file(FileId::new(0), decls);
        store
    }

    /// Set the declarations of a file, replacing whatever it held before.
    pub fn set_file(&self, file: FileId, decls: impl IntoIterator<Item = ClassDecl>) {
        let mut inner = self.inner.write();
        inner.remove_file(file);

        let decls: Vec<Arc<ClassDecl>> = decls.into_iter().map(Arc::new).collect();
        for decl in &decls {
            inner
                .by_name
                .entry(TypeKey::new(&decl.name))
                .or_default()
                .push((file, decl.clone()));
        }
        inner.by_file.insert(file, decls);
    }

    /// Forget every declaration of a file.
    pub fn remove_file(&self, file: FileId) {
        let mut inner = self.inner.write();
        inner.remove_file(file);
        inner.by_file.shift_remove(&file);
    }

    /// All candidates for `name`, in file order.
    pub fn lookup(&self, name: &str) -> Vec<Arc<ClassDecl>> {
        let inner = self.inner.read();
        let Some(candidates) = inner.by_name.get(&TypeKey::new(name)) else {
            return Vec::new();
        };
        let mut candidates: Vec<_> = candidates.iter().collect();
        candidates.sort_by_key(|(file, _)| inner.by_file.get_index_of(file));
        candidates.into_iter().map(|(_, decl)| decl.clone()).collect()
    }

    /// Declarations of one file, in source order.
    pub fn decls_in_file(&self, file: FileId) -> Vec<Arc<ClassDecl>> {
        self.inner
            .read()
            .by_file
            .get(&file)
            .cloned()
            .unwrap_or_default()
    }

    pub fn files(&self) -> Vec<FileId> {
        self.inner.read().by_file.keys().copied().collect()
    }

    /// Number of declarations across all files.
    pub fn len(&self) -> usize {
        self.inner.read().by_file.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MemoryStoreInner {
    fn remove_file(&mut self, file: FileId) {
        let Some(old) = self.by_file.get(&file) else {
            return;
        };
        let keys: Vec<TypeKey> = old.iter().map(|d| TypeKey::new(&d.name)).collect();
        for key in keys {
            if let Some(list) = self.by_name.get_mut(&key) {
                list.retain(|(f, _)| *f != file);
                if list.is_empty() {
                    self.by_name.remove(&key);
                }
            }
        }
    }
}

impl DeclarationStore for MemoryStore {
    fn get_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Arc<ClassDecl>>, StoreError>> {
        future::ready(Ok(self.lookup(name))).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let store = MemoryStore::from_decls([ClassDecl::class("App\\User")]);
        assert_eq!(store.lookup("\\app\\USER").len(), 1);
        assert!(store.lookup("App\\Users").is_empty());
    }

    #[test]
    fn test_set_file_replaces_declarations() {
        let store = MemoryStore::new();
        let file = FileId::new(3);
        store.set_file(file, [ClassDecl::class("A"), ClassDecl::class("B")]);
        assert_eq!(store.len(), 2);

        store.set_file(file, [ClassDecl::class("C")]);
        assert_eq!(store.len(), 1);
        assert!(store.lookup("A").is_empty());
        assert_eq!(store.lookup("C").len(), 1);
    }

    #[test]
    fn test_remove_file() {
        let store = MemoryStore::new();
        store.set_file(FileId::new(0), [ClassDecl::class("A")]);
        store.set_file(FileId::new(1), [ClassDecl::class("B")]);

        store.remove_file(FileId::new(0));
        assert!(store.lookup("A").is_empty());
        assert_eq!(store.files(), vec![FileId::new(1)]);
    }

    #[test]
    fn test_duplicate_candidates_keep_file_order() {
        let store = MemoryStore::new();
        store.set_file(FileId::new(5), [ClassDecl::class("Dup").extends("First")]);
        store.set_file(FileId::new(2), [ClassDecl::class("Dup").extends("Second")]);
        // Re-setting the first file must not move it behind the second.
        store.set_file(FileId::new(5), [ClassDecl::class("Dup").extends("Again")]);

        let found = store.lookup("dup");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].parent_name.as_deref(), Some("Again"));
        assert_eq!(found[1].parent_name.as_deref(), Some("Second"));
    }

    #[test]
    fn test_store_trait_unknown_name_is_empty() {
        let store = MemoryStore::new();
        let found = block_on(store.get_by_name("Nope")).unwrap();
        assert!(found.is_empty());
    }
}
