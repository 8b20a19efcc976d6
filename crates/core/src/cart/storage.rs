//! Key-value storage slot abstraction.
//!
//! Modelled on browser local storage: string keys mapping to string values,
//! read and overwritten whole. Backends that touch the filesystem or a
//! session live outside this crate.

use std::collections::HashMap;

use thiserror::Error;

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend cannot be reached at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend failed while reading or writing.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    /// Wrap a backend-specific error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// A synchronous key-value storage slot.
pub trait CartStorage {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: CartStorage + ?Sized> CartStorage for &mut S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// Standard storage keys.
pub mod keys {
    /// Key under which the cart blob is persisted.
    pub const CART: &str = "aromiqCart";
}

/// In-process storage, used by tests and as a scratch slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage slot pre-seeded with one value.
    #[must_use]
    pub fn with_item(key: &str, value: &str) -> Self {
        let mut items = HashMap::new();
        items.insert(key.to_owned(), value.to_owned());
        Self { items }
    }
}

impl CartStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get_item(keys::CART).unwrap(), None);

        storage.set_item(keys::CART, "[]").unwrap();
        assert_eq!(storage.get_item(keys::CART).unwrap().as_deref(), Some("[]"));

        storage.set_item(keys::CART, "[1]").unwrap();
        assert_eq!(storage.get_item(keys::CART).unwrap().as_deref(), Some("[1]"));

        storage.remove_item(keys::CART).unwrap();
        assert_eq!(storage.get_item(keys::CART).unwrap(), None);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let mut storage = MemoryStorage::new();
        assert!(storage.remove_item("nothing").is_ok());
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Unavailable("quota exceeded".to_string());
        assert_eq!(err.to_string(), "storage unavailable: quota exceeded");
    }
}
