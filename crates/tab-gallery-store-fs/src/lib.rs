//! Persistent key-value storage for tab-gallery settings.

mod error;

pub use error::StoreError;

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info};

const ITEM_EXTENSION: &str = "json";

/// Asynchronous string key-value storage.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` when nothing was written yet.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the backing storage cannot be read.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the value cannot be persisted.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore> KeyValueStore for Arc<S> {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.as_ref().get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.as_ref().set_item(key, value).await
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_owned()))
    }
}

/// Storage keeping one JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the item files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidKey`] for keys outside `[A-Za-z0-9_-]+`.
    pub fn item_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{ITEM_EXTENSION}")))
    }

    fn read_blocking(path: &Path) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write_blocking(root: &Path, path: &Path, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(root)?;
        // Write beside the target so the rename stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(root)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|err| StoreError::Io(err.error))?;
        Ok(())
    }
}

impl KeyValueStore for FsStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.item_path(key)?;
        let value = tokio::task::spawn_blocking(move || Self::read_blocking(&path)).await??;
        debug!(key, found = value.is_some(), "Read item");
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.item_path(key)?;
        let root = self.root.clone();
        let value = value.to_owned();
        let bytes = value.len();
        let target = path.clone();
        tokio::task::spawn_blocking(move || Self::write_blocking(&root, &target, &value)).await??;
        info!(key, bytes, path = %path.display(), "Persisted item");
        Ok(())
    }
}

/// In-process storage, shared between clones.
///
/// Reads and writes can be made to fail on demand to exercise recovery paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    items: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `items`.
    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = items.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self {
            inner: Arc::new(MemoryInner {
                items: Mutex::new(map),
                ..MemoryInner::default()
            }),
        }
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw value currently stored under `key`, bypassing failure injection.
    pub async fn snapshot(&self, key: &str) -> Option<String> {
        self.inner.items.lock().await.get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Other(format!("read of {key:?} rejected")));
        }
        Ok(self.inner.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Other(format!("write of {key:?} rejected")));
        }
        self.inner
            .items
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
