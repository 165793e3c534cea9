use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use thiserror::Error;

use crate::core::Identity;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No content stored under {0}")]
    NotFound(Identity),

    #[error("Content store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Content store unavailable: {0}")]
    Unavailable(String),
}

pub trait ContentStore: Send + Sync {
    fn fetch(&self, identity: &Identity) -> Result<String, StoreError>;

    fn store(&self, content: &str) -> Result<Identity, StoreError>;
}

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, identity: &Identity) -> PathBuf {
        self.root.join(identity.as_str())
    }
}

impl ContentStore for FsStore {
    fn fetch(&self, identity: &Identity) -> Result<String, StoreError> {
        if *identity == Identity::of("") {
            return Ok(String::new());
        }
        match fs::read_to_string(self.path_of(identity)) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(identity.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, content: &str) -> Result<Identity, StoreError> {
        let identity = Identity::of(content);
        let path = self.path_of(&identity);
        if !path.exists() {
            fs::create_dir_all(&self.root)?;
            fs::write(&path, content)?;
            log::debug!("stored {} ({} bytes)", identity, content.len());
        }
        Ok(identity)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<Identity, String>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<'a>(contents: impl IntoIterator<Item = &'a str>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            for content in contents {
                entries.insert(Identity::of(content), content.to_string());
            }
        }
        store
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("offline".into()));
        }
        Ok(())
    }
}

impl ContentStore for MemoryStore {
    fn fetch(&self, identity: &Identity) -> Result<String, StoreError> {
        self.check_online()?;
        if *identity == Identity::of("") {
            return Ok(String::new());
        }
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        entries
            .get(identity)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(identity.clone()))
    }

    fn store(&self, content: &str) -> Result<Identity, StoreError> {
        self.check_online()?;
        let identity = Identity::of(content);
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        entries
            .entry(identity.clone())
            .or_insert_with(|| content.to_string());
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().join("pads"));

        let id = store.store("<h1>hi</h1>").unwrap();
        assert_eq!(id, Identity::of("<h1>hi</h1>"));
        assert_eq!(store.fetch(&id).unwrap(), "<h1>hi</h1>");
        assert_eq!(store.store("<h1>hi</h1>").unwrap(), id);
    }

    #[test]
    fn test_fs_store_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let missing = Identity::parse("abcdef012345").unwrap();
        assert!(matches!(store.fetch(&missing), Err(StoreError::NotFound(id)) if id == missing));
    }

    #[test]
    fn test_empty_content_always_known() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let empty = Identity::parse("e3b0c44298fc").unwrap();
        assert_eq!(store.fetch(&empty).unwrap(), "");
        assert_eq!(MemoryStore::new().fetch(&empty).unwrap(), "");
    }

    #[test]
    fn test_memory_store_offline() {
        let store = MemoryStore::with(["a()"]);
        assert_eq!(store.len(), 1);
        store.set_offline(true);
        assert!(matches!(store.store("b()"), Err(StoreError::Unavailable(_))));
        assert!(store.fetch(&Identity::of("a()")).is_err());
        store.set_offline(false);
        assert_eq!(store.fetch(&Identity::of("a()")).unwrap(), "a()");
    }
}
