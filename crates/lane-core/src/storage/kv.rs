//! Key-value backends
//!
//! The persistence adapter only needs string keys mapped to string
//! values. Three backends are provided:
//!
//! - [`SqliteStore`](super::sqlite::SqliteStore): one `kv` table (default)
//! - [`FileStore`]: one `<key>.json` file per key, written atomically
//! - [`MemoryStore`]: process-local map, for tests and ephemeral sessions

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use super::error::{StorageError, StorageResult};

/// A string-keyed store of string values
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` if the key was never written
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a key; deleting a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Directory-backed key-value store
///
/// Each key lives in `<dir>/<key>.json`. Writes go to a temp file that is
/// synced and renamed over the target, so a crash never leaves a
/// half-written record.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadError { path, source: e }),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        atomic_write(&self.path_for(key), value.as_bytes())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a uniquely named temp file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// Concurrent writers of one path never share a temp file, so the target
/// always holds one complete write.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    // Same directory, so the rename stays on one filesystem
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|source| StorageError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut temp =
        NamedTempFile::new_in(dir).map_err(|e| StorageError::from_io(e, dir.to_path_buf()))?;
    temp.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp.path().to_path_buf()))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| StorageError::from_io(e, temp.path().to_path_buf()))?;

    let temp_path = temp.path().to_path_buf();
    temp.persist(path).map_err(|e| StorageError::AtomicWriteFailed {
        from: temp_path,
        to: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(store: &dyn KeyValueStore) {
        assert!(store.get("greeting").unwrap().is_none());

        store.set("greeting", "hello").unwrap();
        assert_eq!(store.get("greeting").unwrap().as_deref(), Some("hello"));

        store.set("greeting", "bonjour").unwrap();
        assert_eq!(store.get("greeting").unwrap().as_deref(), Some("bonjour"));

        store.remove("greeting").unwrap();
        assert!(store.get("greeting").unwrap().is_none());

        // Removing again is fine
        store.remove("greeting").unwrap();
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_file_store() {
        let temp_dir = TempDir::new().unwrap();
        exercise(&FileStore::new(temp_dir.path()));
    }

    #[test]
    fn test_file_store_creates_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("nested").join("data"));

        store.set("memory_lane_notes", "[]").unwrap();
        assert!(store.path_for("memory_lane_notes").exists());
        assert!(!store.path_for("memory_lane_notes").with_extension("tmp").exists());
    }

    #[test]
    fn test_file_store_unreadable_key_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        fs::create_dir_all(store.path_for("memory_lane_notes")).unwrap();

        let err = store.get("memory_lane_notes").unwrap_err();
        assert!(matches!(err, StorageError::ReadError { .. }));
    }

    #[test]
    fn test_file_store_key_sanitizing() {
        let store = FileStore::new("/data");
        assert_eq!(
            store.path_for("memory_lane_notes"),
            PathBuf::from("/data/memory_lane_notes.json")
        );
        assert_eq!(
            store.path_for("../escape"),
            PathBuf::from("/data/.._escape.json")
        );
    }

    #[test]
    fn test_concurrent_writes_never_tear() {
        let temp_dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(FileStore::new(temp_dir.path()));
        // Longer and shorter records racing for the same key
        let values: Vec<String> = (1..=8)
            .map(|n| format!("[{}7]", "7,".repeat(n * 500)))
            .collect();

        for _ in 0..20 {
            std::thread::scope(|scope| {
                for value in &values {
                    let store = &store;
                    scope.spawn(move || store.set("memory_lane_notes", value).unwrap());
                }
            });

            let stored = store.get("memory_lane_notes").unwrap().unwrap();
            assert!(values.contains(&stored), "torn record of {} bytes", stored.len());
        }

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "memory_lane_notes.json")
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("file.json");

        atomic_write(&nested_path, b"{}").unwrap();

        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "{}");
    }
}
