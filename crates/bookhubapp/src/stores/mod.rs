//! # Stores
//!
//! Four independent stores hold the storefront state. Each one owns a single
//! backend key, loads it on construction and writes it through on every
//! mutation:
//!
//! - [`IdentityStore`]: the session and registered accounts.
//! - [`CatalogStore`]: sellable books, seeded on first run.
//! - [`CartStore`]: the active basket.
//! - [`OrderStore`]: placed orders and their status.
//!
//! Stores never call each other. Cross-store flows such as checkout are
//! composed in [`crate::api`].

pub mod cart;
pub mod catalog;
pub mod identity;
pub mod orders;

pub use cart::CartStore;
pub use catalog::{BookQuery, BookSort, CatalogStore};
pub use identity::IdentityStore;
pub use orders::OrderStore;
