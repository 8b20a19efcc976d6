//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! aromiq-cart add "Oud Noir" 50ml 1200
//! aromiq-cart set "Oud Noir" 50ml 3
//! aromiq-cart set "Oud Noir" 50ml 0     # removes the line
//! aromiq-cart show
//! aromiq-cart total
//! aromiq-cart clear
//! ```
//!
//! Each command takes the opened store and returns the text to print, so
//! they run the same against a file or an in-memory slot.

use std::fmt::Write as _;

use aromiq_core::{CartError, CartStorage, CartStore, CurrencyCode, Price};
use thiserror::Error;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// The cart could not be saved.
    #[error("Failed to save cart: {0}")]
    Cart(#[from] CartError),
}

/// Add one unit of a product/size.
pub fn add<S: CartStorage>(
    store: &mut CartStore<S>,
    name: &str,
    size: &str,
    price: Price,
) -> Result<String, CartCommandError> {
    let quantity = store.add(name, size, price)?;
    Ok(format!("{name} ({size}) added to cart! (quantity {quantity})"))
}

/// Remove a line.
pub fn remove<S: CartStorage>(
    store: &mut CartStore<S>,
    name: &str,
    size: &str,
) -> Result<String, CartCommandError> {
    Ok(match store.remove(name, size)? {
        Some(_) => format!("Removed {name} ({size})"),
        None => format!("No cart line for {name} ({size})"),
    })
}

/// Set the quantity of a line; zero or less removes it.
pub fn set_quantity<S: CartStorage>(
    store: &mut CartStore<S>,
    name: &str,
    size: &str,
    quantity: i64,
) -> Result<String, CartCommandError> {
    if !store.set_quantity(name, size, quantity)? {
        return Ok(format!("No cart line for {name} ({size})"));
    }
    Ok(match store.cart().get(name, size) {
        Some(line) => format!("Set {name} ({size}) quantity to {}", line.quantity),
        None => format!("Removed {name} ({size})"),
    })
}

/// Empty the cart.
pub fn clear<S: CartStorage>(store: &mut CartStore<S>) -> Result<String, CartCommandError> {
    store.clear()?;
    Ok("Cart cleared".to_string())
}

/// Render the cart as a plain-text table.
#[must_use]
pub fn show<S: CartStorage>(store: &CartStore<S>, currency: CurrencyCode) -> String {
    if store.lines().is_empty() {
        return "Your cart is empty".to_string();
    }

    let mut out = String::new();
    for line in store.lines() {
        let _ = writeln!(
            out,
            "{} ({})  x{}  {}",
            line.name,
            line.size,
            line.quantity,
            currency.format(line.line_total())
        );
    }
    let _ = write!(
        out,
        "Items: {}  Total: {}",
        store.item_count(),
        currency.format(store.total())
    );
    out
}

/// The cart total, formatted in `currency`.
#[must_use]
pub fn total<S: CartStorage>(store: &CartStore<S>, currency: CurrencyCode) -> String {
    currency.format(store.total())
}

/// The number of units in the cart.
#[must_use]
pub fn count<S: CartStorage>(store: &CartStore<S>) -> String {
    store.item_count().to_string()
}
