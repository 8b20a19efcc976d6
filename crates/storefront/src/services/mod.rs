//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Session-backed cart (load, mutate, write back)

pub mod cart;

pub use cart::SessionCart;
