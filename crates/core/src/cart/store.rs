//! Persistent cart store.

use thiserror::Error;

use super::Cart;
use super::storage::{CartStorage, StorageError, keys};
use crate::types::{LineItem, Price};

/// Errors that can occur while persisting the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// The storage slot could not be written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A cart bound to a storage slot.
///
/// The blob is read once when the store is opened. Every mutation updates
/// the in-memory cart first and then overwrites the slot with the whole
/// serialized cart; if that write fails the error is returned but the
/// in-memory change stands.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    key: String,
    cart: Cart,
}

impl<S: CartStorage> CartStore<S> {
    /// Open the cart persisted under the default key.
    pub fn open(storage: S) -> Self {
        Self::with_key(storage, keys::CART)
    }

    /// Open the cart persisted under `key`.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = read_cart(&storage, &key);
        tracing::debug!(key = %key, lines = cart.len(), "Cart loaded");
        Self { storage, key, cart }
    }

    /// Re-read the persisted cart from storage.
    ///
    /// Missing or malformed blobs yield an empty cart.
    #[must_use]
    pub fn load(&self) -> Cart {
        read_cart(&self.storage, &self.key)
    }

    /// Add one unit of `(name, size)` and persist. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub fn add(&mut self, name: &str, size: &str, price: Price) -> Result<u32, CartError> {
        let quantity = self.cart.add(name, size, price);
        tracing::info!(product = %name, size = %size, quantity, "Added to cart");
        self.save()?;
        Ok(quantity)
    }

    /// Remove the line for `(name, size)` and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub fn remove(&mut self, name: &str, size: &str) -> Result<Option<LineItem>, CartError> {
        let removed = self.cart.remove(name, size);
        tracing::info!(product = %name, size = %size, removed = removed.is_some(), "Removed from cart");
        self.save()?;
        Ok(removed)
    }

    /// Set the quantity of an existing line, removing it when `quantity <= 0`.
    ///
    /// Nothing is written when no line matches. Returns whether a line
    /// matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub fn set_quantity(
        &mut self,
        name: &str,
        size: &str,
        quantity: i64,
    ) -> Result<bool, CartError> {
        if !self.cart.set_quantity(name, size, quantity) {
            tracing::debug!(product = %name, size = %size, "No cart line to update");
            return Ok(false);
        }
        tracing::info!(product = %name, size = %size, quantity, "Updated cart quantity");
        self.save()?;
        Ok(true)
    }

    /// Empty the cart and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.cart.clear();
        tracing::info!("Cart cleared");
        self.save()
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.total()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        self.cart.lines()
    }

    /// The in-memory cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The storage key this store writes to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Release the storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn save(&mut self) -> Result<(), CartError> {
        let blob = self.cart.to_blob()?;
        self.storage.set_item(&self.key, &blob)?;
        Ok(())
    }
}

fn read_cart<S: CartStorage>(storage: &S, key: &str) -> Cart {
    match storage.get_item(key) {
        Ok(Some(blob)) => Cart::from_blob(&blob),
        Ok(None) => Cart::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Cart storage unreadable, starting empty");
            Cart::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cart::MemoryStorage;

    fn price(s: &str) -> Price {
        Price::parse(s).unwrap()
    }

    /// Counts writes and can be told to fail them.
    #[derive(Default)]
    struct RecordingStorage {
        inner: MemoryStorage,
        writes: usize,
        fail_writes: bool,
        fail_reads: bool,
    }

    impl CartStorage for RecordingStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail_reads {
                return Err(StorageError::Unavailable("disabled".to_string()));
            }
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Unavailable("quota exceeded".to_string()));
            }
            self.writes += 1;
            self.inner.set_item(key, value)
        }

        fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
            self.inner.remove_item(key)
        }
    }

    #[test]
    fn test_open_empty_storage() {
        let store = CartStore::open(MemoryStorage::new());
        assert!(store.cart().is_empty());
        assert_eq!(store.total(), Price::ZERO);
        assert_eq!(store.item_count(), 0);
        assert_eq!(store.key(), keys::CART);
    }

    #[test]
    fn test_open_malformed_blob_is_empty() {
        let storage = MemoryStorage::with_item(keys::CART, "{broken");
        let store = CartStore::open(storage);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_open_unreadable_storage_is_empty() {
        let storage = RecordingStorage {
            fail_reads: true,
            ..Default::default()
        };
        let store = CartStore::open(storage);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_add_add_then_zero_quantity() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add("A", "50ml", price("100")).unwrap();
        store.add("A", "50ml", price("100")).unwrap();

        let persisted = store.load();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted.lines()[0].quantity, 2);
        assert_eq!(store.total(), price("200"));
        assert_eq!(store.item_count(), 2);

        assert!(store.set_quantity("A", "50ml", 0).unwrap());
        assert!(store.lines().is_empty());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_every_mutation_persists() {
        let mut store = CartStore::open(RecordingStorage::default());
        store.add("A", "50ml", price("100")).unwrap();
        store.add("B", "10ml", price("20")).unwrap();
        store.set_quantity("B", "10ml", 5).unwrap();
        store.remove("A", "50ml").unwrap();
        store.remove("missing", "1ml").unwrap();
        store.clear().unwrap();

        assert_eq!(store.storage().writes, 6);
    }

    #[test]
    fn test_set_quantity_on_missing_line_does_not_write() {
        let mut store = CartStore::open(RecordingStorage::default());
        assert!(!store.set_quantity("A", "50ml", 3).unwrap());
        assert_eq!(store.storage().writes, 0);
    }

    #[test]
    fn test_persisted_blob_matches_memory() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add("Oud Noir", "50ml", price("1200")).unwrap();
        store.add("Amber", "10ml", price("350")).unwrap();
        store.set_quantity("Amber", "10ml", 3).unwrap();

        assert_eq!(&store.load(), store.cart());

        let blob = store.storage().get_item(keys::CART).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(value[1]["name"], "Amber");
        assert_eq!(value[1]["quantity"], 3);
    }

    #[test]
    fn test_clear_then_load_is_empty() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add("A", "50ml", price("100")).unwrap();
        store.clear().unwrap();

        let reopened = CartStore::open(store.into_storage());
        assert!(reopened.load().is_empty());
        assert!(reopened.cart().is_empty());
    }

    #[test]
    fn test_reopen_restores_cart() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add("A", "50ml", price("100")).unwrap();
        store.add("B", "10ml", price("20")).unwrap();
        store.add("A", "50ml", price("100")).unwrap();

        let reopened = CartStore::open(store.into_storage());
        assert_eq!(reopened.item_count(), 3);
        assert_eq!(reopened.total(), price("220"));
        assert_eq!(reopened.lines()[0].name, "A");
    }

    #[test]
    fn test_custom_key_is_isolated() {
        let mut storage = MemoryStorage::new();
        {
            let mut store = CartStore::with_key(&mut storage, "otherCart");
            store.add("A", "50ml", price("100")).unwrap();
        }
        assert!(storage.get_item(keys::CART).unwrap().is_none());
        assert!(storage.get_item("otherCart").unwrap().is_some());
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let storage = RecordingStorage {
            fail_writes: true,
            ..Default::default()
        };
        let mut store = CartStore::open(storage);

        let err = store.add("A", "50ml", price("100")).unwrap_err();
        assert!(matches!(err, CartError::Storage(_)));
        assert_eq!(store.item_count(), 1);
    }
}
