//! Cart line items.

use serde::{Deserialize, Serialize};

use super::price::Price;

/// One product/size entry in the cart.
///
/// The serialized field names (`name`, `size`, `price`, `quantity`) are the
/// persisted format and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product name.
    pub name: String,
    /// Variant size label, e.g. `"50ml"`.
    pub size: String,
    /// Unit price at the time the line was first added.
    pub price: Price,
    /// Number of units, always at least 1 for a stored line.
    pub quantity: u32,
}

impl LineItem {
    /// Largest quantity a line can hold. Increments and updates clamp here.
    pub const MAX_QUANTITY: u32 = 1_000_000;

    /// Create a line with a quantity of 1.
    #[must_use]
    pub fn new(name: impl Into<String>, size: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            size: size.into(),
            price,
            quantity: 1,
        }
    }

    /// Whether this line is identified by `(name, size)`.
    #[must_use]
    pub fn matches(&self, name: &str, size: &str) -> bool {
        self.name == name && self.size == size
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}
