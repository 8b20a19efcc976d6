//! Core types for Aromiq.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod line_item;
pub mod price;

pub use line_item::LineItem;
pub use price::{CurrencyCode, CurrencyError, Price, PriceError};
