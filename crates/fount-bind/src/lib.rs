//! Declarative binding of key/resource mappings onto cache subscriptions.
//!
//! This crate provides:
//! - `Envelope` - The per-key `{is_loading, error, data}` view
//! - `DataMap` - A consumer's logical-key → resource-URL mapping
//! - `Binder` - Keeps a `{key: Envelope}` snapshot synchronized with a
//!   changing mapping, discarding stale settlements
//!
//! A consumer declares what it needs; the binder diffs the declaration,
//! subscribes through `fount-cache`, and pushes a fresh snapshot on every
//! surviving settlement. Re-subscription races (the mapping changing, or a
//! refresh landing, while a fetch is in flight) are resolved by a race-guard:
//! each subscription carries a binding generation, and a settlement only
//! applies if the binding it was issued under is still the key's current one.
//!
//! # Example
//!
//! ```rust,ignore
//! use fount_bind::{Binder, DataMap};
//! use fount_cache::ResultCache;
//!
//! let binder = Binder::new(ResultCache::new(my_fetcher));
//! let mut updates = binder.watch();
//!
//! binder.activate(DataMap::from([
//!     ("todos".to_string(), Some("https://api.example.com/todos".to_string())),
//!     ("draft".to_string(), None), // not yet resolvable, skipped
//! ]));
//!
//! while updates.changed().await.is_ok() {
//!     let snapshot = updates.borrow();
//!     // re-render from snapshot["todos"]
//! }
//! ```

mod binder;
mod envelope;

pub use binder::{Binder, DataMap, Snapshot};
pub use envelope::Envelope;
