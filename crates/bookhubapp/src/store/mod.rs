//! # Storage Layer
//!
//! Every store persists its slice through the [`StorageBackend`] trait, a
//! minimal key-value interface over JSON strings. The backend handles the
//! "how" of storage (filesystem vs memory) while the stores in [`crate::stores`]
//! handle the "what".
//!
//! ## Key Layout
//!
//! One backend is shared by all four stores, each owning a distinct key:
//!
//! | Key | Shape | Written by |
//! |-----|-------|------------|
//! | `session.user` | `User` or absent | `IdentityStore` |
//! | `users` | `[UserRecord]` | `IdentityStore` |
//! | `catalog.books` | `[Book]` | `CatalogStore` |
//! | `cart.items` | `[CartItem]` | `CartStore` |
//! | `orders` | `[Order]` | `OrderStore` |
//!
//! No store reads another store's key.
//!
//! ## Write Discipline
//!
//! Stores build the next state, persist it, and only then commit it in memory.
//! A failed write leaves the store exactly as it was.
//!
//! Several processes sharing one data directory are not reconciled: the last
//! writer wins.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: one `<key>.json` file per key, atomic writes.
//! - [`mem_backend::MemBackend`]: for testing logic without filesystem I/O.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::rc::Rc;

pub mod fs_backend;
pub mod mem_backend;

pub const SESSION_KEY: &str = "session.user";
pub const USERS_KEY: &str = "users";
pub const CATALOG_KEY: &str = "catalog.books";
pub const CART_KEY: &str = "cart.items";
pub const ORDERS_KEY: &str = "orders";

/// Abstract interface for raw storage I/O.
///
/// Methods take `&self`: backends that hold state use interior mutability, so
/// a single backend can be shared by every store through an [`Rc`].
pub trait StorageBackend {
    /// Read the raw value stored under `key`.
    /// Returns Ok(None) when nothing was ever written there.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`.
    /// MUST be atomic: readers see either the old or the new value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Rc<B> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Load and decode the JSON value under `key`.
pub fn load_json<T: DeserializeOwned>(
    backend: &impl StorageBackend,
    key: &str,
) -> Result<Option<T>> {
    match backend.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`.
pub fn save_json<T: Serialize + ?Sized>(
    backend: &impl StorageBackend,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string_pretty(value)?;
    backend.set(key, &raw)?;
    tracing::debug!(key, bytes = raw.len(), "persisted slice");
    Ok(())
}
