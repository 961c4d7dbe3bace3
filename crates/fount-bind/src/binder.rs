//! The dependency binder.

use crate::Envelope;
use fount_cache::{CacheKey, ResultCache};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, trace, warn};

/// A consumer's declared mapping from logical key to resource URL.
///
/// A `None` value means "not yet resolvable, skip": the key keeps its last
/// envelope and is never subscribed. Compared structurally when reconciling.
pub type DataMap = BTreeMap<String, Option<String>>;

/// The live per-key view pushed to the consumer.
pub type Snapshot = BTreeMap<String, Envelope>;

struct BinderState {
    active: bool,
    torn_down: bool,
    mapping: DataMap,
    /// The binding each logical key is currently subscribed under: its cache
    /// key plus the binding generation minted at subscribe time. A settlement
    /// callback applies only if both still match, so two successive fetches
    /// of the same cache key can never be confused.
    bound: BTreeMap<String, (CacheKey, u64)>,
    /// Monotonic source for binding generations.
    next_binding: u64,
    envelopes: Snapshot,
}

impl BinderState {
    /// Mint a fresh binding for a key: record it and reset the envelope to
    /// loading. Returns the new binding generation.
    fn rebind(&mut self, key: &str, cache_key: CacheKey) -> u64 {
        self.next_binding += 1;
        self.bound
            .insert(key.to_string(), (cache_key, self.next_binding));
        self.envelopes.insert(key.to_string(), Envelope::loading());
        self.next_binding
    }
}

struct BinderShared {
    state: Mutex<BinderState>,
    updates: watch::Sender<Snapshot>,
}

impl BinderShared {
    /// Publish the current envelopes to watchers. Called after every state
    /// mutation, outside the state lock.
    fn push(&self) {
        let snapshot = self.state.lock().unwrap().envelopes.clone();
        let _ = self.updates.send(snapshot);
    }
}

/// Keeps a per-consumer `{key: Envelope}` snapshot synchronized with a
/// changing [`DataMap`], without leaking stale updates.
///
/// Each binder owns its lifecycle: [`activate`] binds a mapping,
/// [`reconcile`] diffs a new one (structural equality short-circuits all
/// subscription work), and [`teardown`] freezes the snapshot for good. A
/// settlement callback only applies if the binder is still active and the
/// binding it was issued under is still the logical key's current one, so
/// neither a slow fetch for an abandoned URL nor a settlement dequeued just
/// before a refresh can overwrite a newer binding.
///
/// [`activate`]: Binder::activate
/// [`reconcile`]: Binder::reconcile
/// [`teardown`]: Binder::teardown
pub struct Binder {
    cache: ResultCache,
    shared: Arc<BinderShared>,
}

impl Binder {
    /// Create an inert binder over a cache. No subscriptions are issued
    /// until [`activate`](Binder::activate).
    pub fn new(cache: ResultCache) -> Self {
        let (updates, _) = watch::channel(Snapshot::new());
        Self {
            cache,
            shared: Arc::new(BinderShared {
                state: Mutex::new(BinderState {
                    active: false,
                    torn_down: false,
                    mapping: DataMap::new(),
                    bound: BTreeMap::new(),
                    next_binding: 0,
                    envelopes: Snapshot::new(),
                }),
                updates,
            }),
        }
    }

    /// A receiver observing every snapshot push. Watch semantics: a slow
    /// consumer only ever sees the latest snapshot.
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.shared.updates.subscribe()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.state.lock().unwrap().envelopes.clone()
    }

    /// Whether the binder is active (between activate and teardown).
    pub fn is_active(&self) -> bool {
        self.shared.state.lock().unwrap().active
    }

    /// Bind a mapping: every key resets to loading and every key with a URL
    /// is subscribed.
    pub fn activate(&self, mapping: DataMap) {
        self.bind(mapping);
    }

    /// Diff a new mapping against the current one. Structurally equal
    /// mappings are a no-op; anything else rebinds every key, exactly like
    /// [`activate`](Binder::activate) - a dependent set that changes shape
    /// is a new logical query.
    pub fn reconcile(&self, mapping: DataMap) {
        {
            let state = self.shared.state.lock().unwrap();
            if state.active && state.mapping == mapping {
                trace!("mapping unchanged, skipping rebind");
                return;
            }
        }
        self.bind(mapping);
    }

    /// Force a fresh fetch for one key: its cache entry is invalidated and
    /// the key re-subscribed. Other keys are untouched. Unbound or unknown
    /// keys are ignored.
    pub fn refresh(&self, key: &str) {
        let target = {
            let mut state = self.shared.state.lock().unwrap();
            if !state.active {
                return;
            }
            let current = state.bound.get(key).map(|(ck, _)| ck.clone());
            match current {
                Some(cache_key) => {
                    let binding = state.rebind(key, cache_key.clone());
                    Some((cache_key, binding))
                }
                None => None,
            }
        };
        let Some((cache_key, binding)) = target else { return };
        debug!(key, cache_key = %cache_key, "refreshing key");
        self.cache.invalidate(&cache_key);
        self.shared.push();
        self.subscribe_key(key.to_string(), cache_key, binding);
    }

    /// Force a fresh fetch for every bound key: invalidate each bound cache
    /// entry, then re-subscribe the current mapping.
    pub fn refresh_all(&self) {
        let triples = {
            let mut state = self.shared.state.lock().unwrap();
            if !state.active {
                return;
            }
            let bound: Vec<(String, CacheKey)> = state
                .bound
                .iter()
                .map(|(k, (ck, _))| (k.clone(), ck.clone()))
                .collect();
            let mut triples = Vec::with_capacity(bound.len());
            for (key, cache_key) in bound {
                let binding = state.rebind(&key, cache_key.clone());
                triples.push((key, cache_key, binding));
            }
            triples
        };
        debug!(keys = triples.len(), "refreshing all bound keys");
        let distinct: BTreeSet<&CacheKey> = triples.iter().map(|(_, ck, _)| ck).collect();
        for cache_key in distinct {
            self.cache.invalidate(cache_key);
        }
        self.shared.push();
        for (key, cache_key, binding) in triples {
            self.subscribe_key(key, cache_key, binding);
        }
    }

    /// Invalidate the cache entry for a URL and re-subscribe every key
    /// currently bound to it. If no key is bound, only the cache entry is
    /// dropped.
    pub fn invalidate_url(&self, url: &str) {
        let cache_key = CacheKey::get(url);
        self.cache.invalidate(&cache_key);
        let triples = {
            let mut state = self.shared.state.lock().unwrap();
            if !state.active {
                return;
            }
            let matching: Vec<String> = state
                .bound
                .iter()
                .filter(|(_, (ck, _))| *ck == cache_key)
                .map(|(k, _)| k.clone())
                .collect();
            let mut triples = Vec::with_capacity(matching.len());
            for key in matching {
                let binding = state.rebind(&key, cache_key.clone());
                triples.push((key, cache_key.clone(), binding));
            }
            triples
        };
        if triples.is_empty() {
            return;
        }
        debug!(url, keys = triples.len(), "invalidated url, rebinding keys");
        self.shared.push();
        for (key, cache_key, binding) in triples {
            self.subscribe_key(key, cache_key, binding);
        }
    }

    /// Deactivate the binder. Every subsequent settlement callback becomes a
    /// no-op and the snapshot is frozen as-is. Terminal: a torn-down binder
    /// cannot be reactivated.
    pub fn teardown(&self) {
        let mut state = self.shared.state.lock().unwrap();
        state.active = false;
        state.torn_down = true;
        state.bound.clear();
        debug!("binder torn down");
    }

    fn bind(&self, mapping: DataMap) {
        let pairs = {
            let mut state = self.shared.state.lock().unwrap();
            if state.torn_down {
                warn!("ignoring bind on torn-down binder");
                return;
            }
            state.active = true;
            state.bound.clear();
            state.envelopes = mapping
                .keys()
                .map(|k| (k.clone(), Envelope::loading()))
                .collect();
            let mut pairs = Vec::new();
            for (key, target) in &mapping {
                if let Some(url) = target {
                    let cache_key = CacheKey::get(url.clone());
                    let binding = state.rebind(key, cache_key.clone());
                    pairs.push((key.clone(), cache_key, binding));
                }
            }
            state.mapping = mapping;
            pairs
        };
        debug!(keys = pairs.len(), "bound mapping");
        self.shared.push();
        for (key, cache_key, binding) in pairs {
            self.subscribe_key(key, cache_key, binding);
        }
    }

    /// Subscribe one logical key against a cache key. The callback captures
    /// the cache key and binding generation it was issued under; at
    /// settlement it applies only if the binder is active and that binding is
    /// still the key's current one. The generation distinguishes successive
    /// fetches of the same cache key, so a settlement already dequeued when a
    /// refresh invalidates the entry still cannot overwrite the refreshed
    /// value.
    fn subscribe_key(&self, key: String, cache_key: CacheKey, binding: u64) {
        let shared = Arc::clone(&self.shared);
        let issued_for = cache_key.clone();
        self.cache.subscribe(cache_key, move |result| {
            {
                let mut state = shared.state.lock().unwrap();
                if !state.active {
                    trace!(key = %key, "dropping settlement after teardown");
                    return;
                }
                match state.bound.get(&key) {
                    Some((bound_key, bound_binding))
                        if *bound_key == issued_for && *bound_binding == binding => {}
                    _ => {
                        debug!(key = %key, cache_key = %issued_for, "discarding stale settlement");
                        return;
                    }
                }
                state.envelopes.insert(key, Envelope::from_result(result));
            }
            shared.push();
        });
    }
}
