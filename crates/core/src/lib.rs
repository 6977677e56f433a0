//! QuickKart Core - Domain types and state machines.
//!
//! This crate holds everything the storefront needs to reason about a
//! browsing session without touching the network:
//! - [`cart`] - The session cart and its line items
//! - [`selection`] - Which product, if any, is open in the detail view
//! - [`catalog`] - Product records and fetch states supplied by the catalog
//! - [`contact`] - Contact form validation
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async runtime. The storefront crate owns all side effects.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod contact;
pub mod selection;
pub mod types;

pub use cart::{CartError, CartLineItem, CartStore, LineChange, LineKey, Quantity};
pub use catalog::{FetchState, ProductRecord, Rating};
pub use contact::{ContactErrors, ContactField, ContactMessage};
pub use selection::{CloseReason, Selection, SelectionChange};
pub use types::*;
