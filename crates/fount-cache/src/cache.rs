//! The single-flight result cache.

use crate::{CacheKey, PreloadStore};
use fount_http::{decode, FetchError, Fetcher};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// The settled value fanned out to subscribers: a shared decoded payload or a
/// classified failure.
pub type CacheResult = Result<Arc<Value>, FetchError>;

/// One-shot settlement callback. Invoked exactly once when the entry settles,
/// or zero times if the entry is invalidated first.
type Callback = Box<dyn FnOnce(CacheResult) + Send + 'static>;

/// A registered subscription, kept in an ordered list per pending entry.
struct Subscriber {
    key: CacheKey,
    callback: Callback,
}

enum EntryState {
    Pending { subscribers: Vec<Subscriber> },
    Settled(CacheResult),
}

struct CacheEntry {
    /// Fetch generation this entry belongs to. A settlement carrying a stale
    /// generation (the entry was invalidated and re-created meanwhile) is
    /// discarded.
    generation: u64,
    state: EntryState,
}

#[derive(Default)]
struct Store {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Keys whose preload entry has already been consulted. Bootstrap data is
    /// cold-start only: after invalidation the key goes to the network.
    preload_seen: HashSet<CacheKey>,
}

struct CacheInner {
    fetcher: Arc<dyn Fetcher>,
    preload: PreloadStore,
    store: Mutex<Store>,
    generations: AtomicU64,
}

/// Keyed store of in-flight and settled fetch results.
///
/// Guarantees single-flight per key: concurrent demand for the same
/// [`CacheKey`] joins one underlying fetch, and every subscriber observes the
/// settled value exactly once, in registration order. Settled entries serve
/// later reads synchronously until explicitly invalidated; the cache never
/// retries on its own.
///
/// Handles are cheap clones over shared state. All bookkeeping is synchronous
/// under one lock; subscriber callbacks always run outside it.
#[derive(Clone)]
pub struct ResultCache {
    inner: Arc<CacheInner>,
}

impl ResultCache {
    /// Create a cache over the given fetch primitive.
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_preload(fetcher, PreloadStore::new())
    }

    /// Create a cache that consults bootstrap data before fetching.
    pub fn with_preload(fetcher: Arc<dyn Fetcher>, preload: PreloadStore) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                fetcher,
                preload,
                store: Mutex::new(Store::default()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Register interest in a key.
    ///
    /// If the entry is already settled the callback runs synchronously with a
    /// clone of the cached value and no fetch occurs. If the entry is pending
    /// the callback is queued for settlement. If the entry is absent, the
    /// preload store is consulted; on a miss exactly one fetch task is
    /// started.
    ///
    /// Must be called from within a tokio runtime (fetches are spawned).
    pub fn subscribe<F>(&self, key: CacheKey, callback: F)
    where
        F: FnOnce(CacheResult) + Send + 'static,
    {
        let callback: Callback = Box::new(callback);
        let mut invoke: Option<(Callback, CacheResult)> = None;
        let mut spawn_generation: Option<u64> = None;

        {
            let mut store = self.inner.store.lock().unwrap();
            match store.entries.get_mut(&key) {
                Some(entry) => match &mut entry.state {
                    EntryState::Settled(result) => {
                        trace!(key = %key, "serving settled entry");
                        invoke = Some((callback, result.clone()));
                    }
                    EntryState::Pending { subscribers } => {
                        trace!(key = %key, "joining in-flight fetch");
                        subscribers.push(Subscriber {
                            key: key.clone(),
                            callback,
                        });
                    }
                },
                None => {
                    let preloaded = if store.preload_seen.insert(key.clone()) {
                        self.inner.preload.get(&key)
                    } else {
                        None
                    };
                    if let Some(value) = preloaded {
                        debug!(key = %key, "settling from preloaded data");
                        let result: CacheResult = Ok(Arc::new(value.clone()));
                        let generation = self.next_generation();
                        store.entries.insert(
                            key.clone(),
                            CacheEntry {
                                generation,
                                state: EntryState::Settled(result.clone()),
                            },
                        );
                        invoke = Some((callback, result));
                    } else {
                        let generation = self.next_generation();
                        store.entries.insert(
                            key.clone(),
                            CacheEntry {
                                generation,
                                state: EntryState::Pending {
                                    subscribers: vec![Subscriber {
                                        key: key.clone(),
                                        callback,
                                    }],
                                },
                            },
                        );
                        spawn_generation = Some(generation);
                    }
                }
            }
        }

        if let Some(generation) = spawn_generation {
            self.spawn_fetch(key, generation);
        }
        if let Some((callback, result)) = invoke {
            callback(result);
        }
    }

    /// Fetch a key, joining any in-flight operation for it.
    ///
    /// If the entry is invalidated before settling, the call re-subscribes
    /// and joins (or starts) a fresh fetch rather than resolving.
    pub async fn get(&self, key: CacheKey) -> CacheResult {
        loop {
            let (tx, rx) = oneshot::channel();
            self.subscribe(key.clone(), move |result| {
                let _ = tx.send(result);
            });
            if let Ok(result) = rx.await {
                return result;
            }
            // Entry discarded before settlement; start over.
        }
    }

    /// Remove the entry for a key, regardless of state.
    ///
    /// Pending subscribers are dropped uninvoked and the orphaned in-flight
    /// fetch settles into nothing. No notification is sent; interested
    /// callers re-subscribe.
    pub fn invalidate(&self, key: &CacheKey) {
        let removed = self.inner.store.lock().unwrap().entries.remove(key);
        if removed.is_some() {
            debug!(key = %key, "invalidated entry");
        }
    }

    /// Remove every entry. Same per-entry semantics as [`invalidate`].
    ///
    /// [`invalidate`]: ResultCache::invalidate
    pub fn invalidate_all(&self) {
        let mut store = self.inner.store.lock().unwrap();
        let count = store.entries.len();
        store.entries.clear();
        debug!(count, "invalidated all entries");
    }

    /// Whether an entry (pending or settled) exists for a key.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.store.lock().unwrap().entries.contains_key(key)
    }

    fn next_generation(&self) -> u64 {
        self.inner.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn spawn_fetch(&self, key: CacheKey, generation: u64) {
        debug!(key = %key, generation, "starting fetch");
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result: CacheResult = match inner.fetcher.send(key.to_request()).await {
                Ok(response) => decode(&response).map(Arc::new),
                Err(error) => Err(error),
            };
            settle(&inner, &key, generation, result);
        });
    }
}

/// Apply a fetch result to its entry and fan out to subscribers.
///
/// The subscriber list is moved out before any callback runs, so a callback
/// that re-subscribes sees a settled entry instead of re-entering the list.
fn settle(inner: &CacheInner, key: &CacheKey, generation: u64, result: CacheResult) {
    let subscribers = {
        let mut store = inner.store.lock().unwrap();
        match store.entries.get_mut(key) {
            Some(entry) if entry.generation == generation => {
                let previous =
                    std::mem::replace(&mut entry.state, EntryState::Settled(result.clone()));
                match previous {
                    EntryState::Pending { subscribers } => subscribers,
                    // A generation settles at most once; nothing to fan out.
                    EntryState::Settled(_) => return,
                }
            }
            _ => {
                debug!(key = %key, generation, "discarding orphaned fetch result");
                return;
            }
        }
    };

    debug!(key = %key, generation, subscribers = subscribers.len(), "settled");
    for subscriber in subscribers {
        trace!(key = %subscriber.key, "notifying subscriber");
        (subscriber.callback)(result.clone());
    }
}
