//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use fount_sdk::prelude::*;
//! ```
//!
//! This imports all commonly used items:
//! - Composition: `Fount`
//! - Binding: `Binder`, `DataMap`, `Envelope`, `Snapshot`
//! - Caching: `ResultCache`, `CacheKey`, `PreloadStore`
//! - Transport: `Fetcher`, `ApiClient`, `Request`, `Response`, `FetchError`

pub use crate::Fount;

// Binding
pub use fount_bind::{Binder, DataMap, Envelope, Snapshot};

// Caching
pub use fount_cache::{CacheKey, CacheResult, PreloadStore, ResultCache};

// Transport
pub use fount_http::{ApiClient, FetchError, Fetcher, Method, Request, Response};
