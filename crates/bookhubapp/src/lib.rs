//! # Bookhub Architecture
//!
//! Bookhub is the **persisted state layer of an online bookstore**: who is
//! logged in, what is for sale, what is in the basket and which orders were
//! placed. It is a library first. The `bookhub` CLI is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (bookhub crate)                                        │
//! │  - Parses arguments, renders tables, owns exit codes        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs)                                               │
//! │  - Composes stores: checkout, ownership and admin checks    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Stores (stores/*.rs)                                       │
//! │  - Identity, Catalog, Cart, Orders                          │
//! │  - Each owns one key and writes through on every mutation   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (store/)                                           │
//! │  - StorageBackend trait: FsBackend, MemBackend              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout or stderr and never
//! exits the process. Diagnostics go through `tracing`; the embedding binary
//! decides whether and where they are printed.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade every client talks to
//! - [`checkout`]: pricing and the payment hand-off types
//! - [`config`]: tax, currency and delivery settings
//! - [`error`]: the crate's error type
//! - [`init`]: data directory resolution and startup
//! - [`model`]: the persisted records
//! - [`seed`]: the catalog written on first run
//! - [`store`]: the key-value backend abstraction
//! - [`stores`]: the four stores

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod init;
pub mod model;
pub mod seed;
pub mod store;
pub mod stores;
