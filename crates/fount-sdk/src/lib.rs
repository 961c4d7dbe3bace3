//! # Fount SDK
//!
//! Client-side request caching for UI consumers: declare the resources you
//! need, get back a live `{key: Envelope}` snapshot, and let the cache
//! deduplicate concurrent fetches behind the scenes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fount_sdk::prelude::*;
//! use std::sync::Arc;
//!
//! // The host supplies the transport.
//! let fount = Fount::new(my_fetcher)
//!     .with_preload(PreloadStore::from_json(server_rendered_blob));
//!
//! let binder = fount.binder();
//! let mut updates = binder.watch();
//! binder.activate(DataMap::from([
//!     ("todos".to_string(), Some("https://api.example.com/todos".to_string())),
//! ]));
//!
//! // One-off requests bypass the cache.
//! let created = fount.client().post("https://api.example.com/todos", &new_todo).await?;
//! ```
//!
//! ## Architecture
//!
//! - `fount-http` - Transport seam (`Fetcher`), decode rule, error taxonomy
//! - `fount-cache` - Single-flight keyed result cache with fan-out
//! - `fount-bind` - Per-consumer mapping binder with race-guarded snapshots

pub mod prelude;

// Re-export core crates
pub use fount_bind;
pub use fount_cache;
pub use fount_http;

// Re-export core types
pub use fount_bind::{Binder, DataMap, Envelope, Snapshot};
pub use fount_cache::{CacheKey, CacheResult, PreloadStore, ResultCache};
pub use fount_http::{decode, ApiClient, FetchError, Fetcher, Method, Request, Response};

use std::sync::Arc;

/// The composition root: owns the explicitly constructed cache shared by
/// every binder, plus the thin client for one-off requests.
///
/// The cache is never a hidden global; build one `Fount` where the
/// application starts and hand out binders from it.
pub struct Fount {
    fetcher: Arc<dyn Fetcher>,
    cache: ResultCache,
    client: ApiClient,
}

impl Fount {
    /// Build a data layer over the injected fetch primitive.
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            cache: ResultCache::new(Arc::clone(&fetcher)),
            client: ApiClient::new(Arc::clone(&fetcher)),
            fetcher,
        }
    }

    /// Seed the cache with server-rendered bootstrap data. Replaces the
    /// cache, so call this before handing out binders.
    pub fn with_preload(mut self, preload: PreloadStore) -> Self {
        self.cache = ResultCache::with_preload(Arc::clone(&self.fetcher), preload);
        self
    }

    /// The shared result cache.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// The uncached request client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Create a binder over the shared cache.
    pub fn binder(&self) -> Binder {
        Binder::new(self.cache.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn send(&self, _request: Request) -> Result<Response, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Response::new(
                200,
                HashMap::new(),
                br#"{"id":1}"#.to_vec(),
            ))
        }
    }

    #[tokio::test]
    async fn test_binders_share_one_cache() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let fount = Fount::new(fetcher.clone());

        let url = "https://api.example.com/items";
        fount.cache().get(CacheKey::get(url)).await.unwrap();

        // A binder created afterwards reads the same settled entry.
        let binder = fount.binder();
        binder.activate(DataMap::from([(
            "items".to_string(),
            Some(url.to_string()),
        )]));
        assert!(binder.snapshot()["items"].is_settled());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_preload_reaches_binders() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let url = "https://api.example.com/me";
        let mut preload = PreloadStore::new();
        preload.insert(format!("GET::{}", url), serde_json::json!({"id": 7}));
        let fount = Fount::new(fetcher.clone()).with_preload(preload);

        let binder = fount.binder();
        binder.activate(DataMap::from([("me".to_string(), Some(url.to_string()))]));

        let snapshot = binder.snapshot();
        assert_eq!(
            snapshot["me"].data.as_deref(),
            Some(&serde_json::json!({"id": 7}))
        );
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }
}
