//! File-backed storage slot.
//!
//! The file holds a single JSON object mapping storage keys to string
//! values, the same shape as browser local storage. Each write rewrites the
//! whole file through a temporary sibling and a rename.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use aromiq_core::{CartStorage, StorageError};
use thiserror::Error;

/// Errors that can occur while accessing the storage file.
#[derive(Debug, Error)]
pub enum FileStorageError {
    /// Reading or writing the file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not a JSON object of strings.
    #[error("invalid storage file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

type Items = BTreeMap<String, String>;

/// Storage slot persisted to a JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> FileStorageError {
        FileStorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_items(&self) -> Result<Items, FileStorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Items::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(Items::new());
        }

        serde_json::from_str(&content).map_err(|source| FileStorageError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Read the current items, starting over if the file is corrupt.
    fn read_items_for_write(&self) -> Result<Items, FileStorageError> {
        match self.read_items() {
            Err(FileStorageError::Json { path, source }) => {
                tracing::warn!(path = %path.display(), error = %source, "Replacing corrupt storage file");
                Ok(Items::new())
            }
            other => other,
        }
    }

    fn write_items(&self, items: &Items) -> Result<(), FileStorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(items).map_err(|source| FileStorageError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), keys = items.len(), "Storage file written");
        Ok(())
    }
}

impl CartStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut items = self.read_items().map_err(StorageError::backend)?;
        Ok(items.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.read_items_for_write().map_err(StorageError::backend)?;
        items.insert(key.to_owned(), value.to_owned());
        self.write_items(&items).map_err(StorageError::backend)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let mut items = self.read_items_for_write().map_err(StorageError::backend)?;
        if items.remove(key).is_some() {
            self.write_items(&items).map_err(StorageError::backend)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use aromiq_core::{CartStore, Price, keys};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("storage.json"));
        assert_eq!(storage.get_item(keys::CART).unwrap(), None);
    }

    #[test]
    fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(temp_dir.path().join("nested/storage.json"));

        storage.set_item("a", "1").unwrap();
        storage.set_item("b", "2").unwrap();
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));

        let reopened = FileStorage::new(storage.path());
        assert_eq!(reopened.get_item("b").unwrap().as_deref(), Some("2"));

        storage.remove_item("a").unwrap();
        assert_eq!(storage.get_item("a").unwrap(), None);
        assert_eq!(storage.get_item("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_corrupt_file_is_error_on_read_and_replaced_on_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let mut storage = FileStorage::new(&path);
        assert!(storage.get_item("a").is_err());

        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_cart_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");

        let mut store = CartStore::open(FileStorage::new(&path));
        store
            .add("Oud Noir", "50ml", Price::parse("1200").unwrap())
            .unwrap();
        store
            .add("Oud Noir", "50ml", Price::parse("1200").unwrap())
            .unwrap();

        let reopened = CartStore::open(FileStorage::new(&path));
        assert_eq!(reopened.item_count(), 2);
        assert_eq!(reopened.total(), Price::parse("2400").unwrap());
    }

    #[test]
    fn test_corrupt_file_opens_as_empty_cart() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(&path, "{{{{").unwrap();

        let store = CartStore::open(FileStorage::new(&path));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_malformed_cart_blob_opens_as_empty_cart() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(temp_dir.path().join("storage.json"));
        storage.set_item(keys::CART, "[{\"name\":1}]").unwrap();

        let store = CartStore::open(storage);
        assert!(store.cart().is_empty());
    }
}
