//! Cart state and its persistence contract.
//!
//! [`Cart`] is the in-memory line list with the merge/update/remove rules.
//! [`CartStore`] pairs a cart with a [`CartStorage`] slot and writes the whole
//! list back after every mutation.
//!
//! # Invariants
//!
//! - No two lines share a `(name, size)` key.
//! - Every stored line has a quantity between 1 and
//!   [`LineItem::MAX_QUANTITY`].
//! - Lines keep insertion order.

mod storage;
mod store;

pub use storage::{CartStorage, MemoryStorage, StorageError, keys};
pub use store::{CartError, CartStore};

use serde::Serialize;

use crate::types::{LineItem, Price};

/// Ordered list of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Parse a persisted blob, treating anything unreadable as an empty cart.
    ///
    /// Parsed carts are normalized: zero-quantity lines are dropped,
    /// duplicate keys are merged into their first occurrence and
    /// quantities are clamped to [`LineItem::MAX_QUANTITY`].
    #[must_use]
    pub fn from_blob(blob: &str) -> Self {
        match Self::parse_blob(blob) {
            Ok(cart) => cart,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable cart blob");
                Self::new()
            }
        }
    }

    /// Parse a persisted blob strictly.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the blob is not a valid line list.
    pub fn parse_blob(blob: &str) -> Result<Self, serde_json::Error> {
        let lines: Vec<LineItem> = serde_json::from_str(blob)?;
        Ok(Self::normalized(lines))
    }

    /// Serialize the whole cart into its persisted form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }

    fn normalized(raw: Vec<LineItem>) -> Self {
        let mut cart = Self::new();
        for mut line in raw {
            if line.quantity == 0 {
                tracing::debug!(product = %line.name, size = %line.size, "Dropping zero-quantity line");
                continue;
            }
            match cart.position(&line.name, &line.size) {
                Some(index) => {
                    if let Some(existing) = cart.lines.get_mut(index) {
                        existing.quantity =
                            clamp(existing.quantity.saturating_add(line.quantity));
                    }
                }
                None => {
                    line.quantity = clamp(line.quantity);
                    cart.lines.push(line);
                }
            }
        }
        cart
    }

    fn position(&self, name: &str, size: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.matches(name, size))
    }

    /// Add one unit of `(name, size)` and return the line's new quantity.
    ///
    /// An existing line gets its quantity bumped and keeps its original
    /// price; otherwise a new line with quantity 1 is appended.
    pub fn add(&mut self, name: &str, size: &str, price: Price) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|line| line.matches(name, size)) {
            line.quantity = clamp(line.quantity.saturating_add(1));
            return line.quantity;
        }
        self.lines.push(LineItem::new(name, size, price));
        1
    }

    /// Remove the line for `(name, size)`, returning it if it existed.
    pub fn remove(&mut self, name: &str, size: &str) -> Option<LineItem> {
        self.position(name, size).map(|index| self.lines.remove(index))
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero or less removes the line. Quantities beyond
    /// [`LineItem::MAX_QUANTITY`] are clamped. Returns `false` if no line
    /// matched.
    pub fn set_quantity(&mut self, name: &str, size: &str, quantity: i64) -> bool {
        let Some(index) = self.position(name, size) else {
            return false;
        };

        if quantity <= 0 {
            self.lines.remove(index);
        } else if let Some(line) = self.lines.get_mut(index) {
            line.quantity = clamp(u32::try_from(quantity).unwrap_or(u32::MAX));
        }
        true
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(LineItem::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Look up the line for `(name, size)`.
    #[must_use]
    pub fn get(&self, name: &str, size: &str) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.matches(name, size))
    }

    /// All lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

const fn clamp(quantity: u32) -> u32 {
    if quantity > LineItem::MAX_QUANTITY {
        LineItem::MAX_QUANTITY
    } else {
        quantity
    }
}
