//! Session-backed cart.
//!
//! The visitor's session is the storage slot: the serialized cart lives
//! under a single session key as a JSON string, exactly as the browser
//! widget keeps it in local storage. Session access is async, so this type
//! mirrors [`aromiq_core::CartStore`] instead of implementing the sync
//! storage trait.

use aromiq_core::{Cart, CartError, LineItem, Price, StorageError};
use tower_sessions::Session;

/// A visitor's cart bound to their session.
#[derive(Clone)]
pub struct SessionCart {
    session: Session,
    key: String,
    cart: Cart,
}

impl SessionCart {
    /// Load the cart stored under `key`.
    ///
    /// Missing, malformed or unreadable values yield an empty cart.
    pub async fn load(session: Session, key: &str) -> Self {
        let cart = match session.get::<String>(key).await {
            Ok(Some(blob)) => Cart::from_blob(&blob),
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Session cart unreadable, starting empty");
                Cart::new()
            }
        };

        Self {
            session,
            key: key.to_owned(),
            cart,
        }
    }

    /// Add one unit of `(name, size)` and persist. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn add(&mut self, name: &str, size: &str, price: Price) -> Result<u32, CartError> {
        let quantity = self.cart.add(name, size, price);
        tracing::info!(product = %name, size = %size, quantity, "Added to cart");
        self.save().await?;
        Ok(quantity)
    }

    /// Remove the line for `(name, size)` and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn remove(&mut self, name: &str, size: &str) -> Result<Option<LineItem>, CartError> {
        let removed = self.cart.remove(name, size);
        tracing::info!(product = %name, size = %size, removed = removed.is_some(), "Removed from cart");
        self.save().await?;
        Ok(removed)
    }

    /// Set the quantity of a line, removing it when `quantity <= 0`.
    ///
    /// Nothing is written when no line matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn set_quantity(
        &mut self,
        name: &str,
        size: &str,
        quantity: i64,
    ) -> Result<bool, CartError> {
        if !self.cart.set_quantity(name, size, quantity) {
            return Ok(false);
        }
        tracing::info!(product = %name, size = %size, quantity, "Updated cart quantity");
        self.save().await?;
        Ok(true)
    }

    /// Empty the cart and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear(&mut self) -> Result<(), CartError> {
        self.cart.clear();
        tracing::info!("Cart cleared");
        self.save().await
    }

    /// The in-memory cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    async fn save(&self) -> Result<(), CartError> {
        let blob = self.cart.to_blob()?;
        self.session
            .insert(&self.key, blob)
            .await
            .map_err(StorageError::backend)?;
        Ok(())
    }
}
