//! Durable key-value storage for user-specific dashboard state.
//!
//! The registry persists its override map through this narrow interface and
//! stays agnostic to the backend: an in-memory map, one file per key, or a
//! SQLite table behind a worker thread.

mod migrations;
pub mod sqlite;

pub use sqlite::SqliteStore;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::{fs, io};

use anyhow::{Context, Result};

pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Ephemeral in-memory store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store: one file per key under a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create storage directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        fs::write(&path, value)
            .with_context(|| format!("failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kinboard-storage-{tag}-{}", std::process::id()))
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert_eq!(store.read("widget_overrides").unwrap(), None);

        store.write("widget_overrides", "{}").unwrap();
        assert_eq!(
            store.read("widget_overrides").unwrap().as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn file_store_round_trips_and_reports_absence() {
        let dir = temp_dir("file");
        let store = FileStore::new(dir.clone()).unwrap();

        assert_eq!(store.read("widget_overrides").unwrap(), None);

        store.write("widget_overrides", r#"{"daily-quiz":{}}"#).unwrap();
        assert_eq!(
            store.read("widget_overrides").unwrap().as_deref(),
            Some(r#"{"daily-quiz":{}}"#)
        );

        // A second store over the same directory sees the same data
        let reopened = FileStore::new(dir.clone()).unwrap();
        assert!(reopened.read("widget_overrides").unwrap().is_some());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn file_store_overwrites_in_place() {
        let dir = temp_dir("overwrite");
        let store = FileStore::new(dir.clone()).unwrap();

        store.write("k", "one").unwrap();
        store.write("k", "two").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("two"));

        let _ = fs::remove_dir_all(dir);
    }
}
