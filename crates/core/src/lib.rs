//! Aromiq Core - Cart state and shared types.
//!
//! This crate provides the pieces shared by every Aromiq component:
//! - `storefront` - HTTP cart API backed by visitor sessions
//! - `cli` - Command-line tool for file-backed carts
//!
//! # Architecture
//!
//! The core crate contains only types, traits and in-memory state - no file
//! access, no HTTP. Storage backends that do I/O live in the crates that
//! need them and plug in through [`cart::CartStorage`].
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for prices, currencies and line items
//! - [`cart`] - Cart reconciliation logic and its persistence contract

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartError, CartStorage, CartStore, MemoryStorage, StorageError, keys};
pub use types::*;
