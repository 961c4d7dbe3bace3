//! Single-flight keyed result cache with subscriber fan-out.
//!
//! This crate provides:
//! - `ResultCache` - Keyed store of in-flight/settled fetch results
//! - `CacheKey` - Method + target composite key (`"GET::<url>"`)
//! - `PreloadStore` - Server-rendered bootstrap data consulted before fetching
//! - `CacheResult` - The settled value fanned out to subscribers
//!
//! The cache sits between consumers and an injected [`fount_http::Fetcher`]:
//! concurrent demand for one key joins a single fetch, every subscriber is
//! notified exactly once on settlement, and settled entries serve later reads
//! synchronously until explicitly invalidated. There is no TTL and no retry;
//! refresh policy belongs to the caller, via invalidate + re-subscribe.
//!
//! # Example
//!
//! ```rust,ignore
//! use fount_cache::{CacheKey, ResultCache};
//!
//! let cache = ResultCache::new(my_fetcher);
//!
//! // Joins the in-flight fetch if one exists, otherwise starts it.
//! let todos = cache.get(CacheKey::get("https://api.example.com/todos")).await?;
//!
//! // Push-style: callback runs on settlement (or synchronously if settled).
//! cache.subscribe(CacheKey::get("https://api.example.com/todos"), |result| {
//!     // ...
//! });
//! ```

mod cache;
mod key;
mod preload;

pub use cache::{CacheResult, ResultCache};
pub use key::CacheKey;
pub use preload::PreloadStore;
