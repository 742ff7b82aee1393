//! Read-through query cache with grouped invalidation
//!
//! All remote reads go through [`QueryCache::get_with`]: a fresh entry is
//! returned without touching the network, a stale or absent entry starts a
//! fetch, and concurrent callers for the same key share the outcome of the
//! single in-flight fetch. Entries are replaced atomically per key and a
//! fetch failure never corrupts the previously cached value.
//!
//! Invalidation is by key prefix: session changes and successful mutations
//! drop whole resource groups, and watched keys are refetched in the
//! background immediately after being dropped.

mod key;

pub use key::QueryKey;

use crate::error::{ClientError, ClientResult};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Staleness policy for a resource class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// Refetch on every reference; concurrent callers still share one
    /// in-flight fetch.
    OnDemand,
    /// Fresh for the given window after a successful fetch.
    Window(Duration),
    /// Never stale by age; dropped only by explicit invalidation.
    UntilInvalidated,
}

impl Staleness {
    fn is_fresh(&self, fetched_at: Instant) -> bool {
        match self {
            Staleness::OnDemand => false,
            Staleness::Window(window) => fetched_at.elapsed() < *window,
            Staleness::UntilInvalidated => true,
        }
    }
}

type FetchResult = Result<Value, ClientError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;
type Refresher = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// One cached value. Replacement is atomic per key: a slot is inserted
/// whole or not at all, never partially updated.
struct CacheSlot {
    value: Value,
    fetched_at: Instant,
    staleness: Staleness,
}

impl CacheSlot {
    fn is_fresh(&self) -> bool {
        self.staleness.is_fresh(self.fetched_at)
    }
}

struct CacheInner {
    entries: RwLock<HashMap<QueryKey, CacheSlot>>,
    /// At most one outstanding fetch per key; the id lets a completing
    /// fetch deregister itself without clobbering a successor that was
    /// installed after an invalidation detached it.
    in_flight: Mutex<HashMap<QueryKey, (u64, SharedFetch)>>,
    watchers: RwLock<HashMap<QueryKey, Refresher>>,
    /// Bumped on every invalidation. A fetch stores its result only if the
    /// generation is unchanged since it started, so a value fetched before
    /// an invalidation can never reappear after it.
    generation: AtomicU64,
    fetch_seq: AtomicU64,
    fetch_count: AtomicU64,
}

impl CacheInner {
    fn fresh_value(&self, key: &QueryKey) -> Option<Value> {
        let entries = self.entries.read();
        let slot = entries.get(key)?;
        slot.is_fresh().then(|| slot.value.clone())
    }

    fn store(&self, key: &QueryKey, value: Value, staleness: Staleness, started_generation: u64) {
        if self.generation.load(Ordering::SeqCst) != started_generation {
            debug!(key = %key, "discarding fetch result that predates an invalidation");
            return;
        }
        self.entries.write().insert(
            key.clone(),
            CacheSlot {
                value,
                fetched_at: Instant::now(),
                staleness,
            },
        );
    }
}

/// Keyed, time-windowed read-through cache. Cheap to clone; clones share
/// the same state.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
                watchers: RwLock::new(HashMap::new()),
                generation: AtomicU64::new(0),
                fetch_seq: AtomicU64::new(0),
                fetch_count: AtomicU64::new(0),
            }),
        }
    }

    /// Read through the cache.
    ///
    /// Returns the cached value when it is still fresh under the entry's
    /// staleness policy. Otherwise joins the in-flight fetch for this key
    /// if one exists, or starts one. On fetch failure the previous value
    /// (if any) is retained and the error is returned to every waiting
    /// caller.
    pub async fn get_with<T, F, Fut>(
        &self,
        key: QueryKey,
        staleness: Staleness,
        fetcher: F,
    ) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        if let Some(value) = self.inner.fresh_value(&key) {
            return serde_json::from_value(value).map_err(Into::into);
        }

        let fetch = self.join_fetch(key, staleness, move || {
            let fut = fetcher();
            async move {
                let value = fut.await?;
                serde_json::to_value(value).map_err(ClientError::from)
            }
            .boxed()
        });

        let value = fetch.await?;
        serde_json::from_value(value).map_err(Into::into)
    }

    fn join_fetch(
        &self,
        key: QueryKey,
        staleness: Staleness,
        make: impl FnOnce() -> BoxFuture<'static, FetchResult>,
    ) -> SharedFetch {
        let mut in_flight = self.inner.in_flight.lock();
        if let Some((_, existing)) = in_flight.get(&key) {
            return existing.clone();
        }
        // the entry may have been refreshed while we waited for the lock
        if let Some(value) = self.inner.fresh_value(&key) {
            return async move { Ok(value) }.boxed().shared();
        }

        let fetch_id = self.inner.fetch_seq.fetch_add(1, Ordering::SeqCst);
        let started_generation = self.inner.generation.load(Ordering::SeqCst);
        self.inner.fetch_count.fetch_add(1, Ordering::SeqCst);

        let inner = Arc::clone(&self.inner);
        let fetch_key = key.clone();
        let fut = make();
        let fetch = async move {
            let result = fut.await;
            match &result {
                Ok(value) => inner.store(&fetch_key, value.clone(), staleness, started_generation),
                Err(err) => {
                    debug!(key = %fetch_key, error = %err, "fetch failed; previous value retained");
                }
            }
            let mut in_flight = inner.in_flight.lock();
            if in_flight.get(&fetch_key).is_some_and(|(id, _)| *id == fetch_id) {
                in_flight.remove(&fetch_key);
            }
            result
        }
        .boxed()
        .shared();

        in_flight.insert(key, (fetch_id, fetch.clone()));
        fetch
    }

    /// Read the retained value for a key regardless of freshness.
    pub fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.inner.entries.read();
        let slot = entries.get(key)?;
        serde_json::from_value(slot.value.clone()).ok()
    }

    /// Drop every entry whose key starts with `prefix`, detach matching
    /// in-flight fetches so their results are discarded, and refetch
    /// watched keys under the prefix in the background.
    pub fn invalidate(&self, prefix: &QueryKey) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        let dropped = {
            let mut entries = self.inner.entries.write();
            let before = entries.len();
            entries.retain(|key, _| !key.starts_with(prefix));
            before - entries.len()
        };
        self.inner
            .in_flight
            .lock()
            .retain(|key, _| !key.starts_with(prefix));
        debug!(prefix = %prefix, dropped, "cache group invalidated");
        self.refresh_watched(prefix);
    }

    /// Invalidate every address-scoped group for one identity: profile,
    /// balances, contracts-by-user and applications-by-freelancer.
    pub fn invalidate_for_address(&self, address: &str) {
        for prefix in [
            QueryKey::profile(address),
            QueryKey::balances(address),
            QueryKey::contracts_by_user(address),
            QueryKey::applications_by_freelancer(address),
        ] {
            self.invalidate(&prefix);
        }
    }

    /// Register a background refresher for a key: after any invalidation
    /// covering the key, the refresher is spawned immediately.
    pub fn watch<F, Fut>(&self, key: QueryKey, refresher: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner
            .watchers
            .write()
            .insert(key, Box::new(move || refresher().boxed()));
    }

    pub fn unwatch(&self, key: &QueryKey) {
        self.inner.watchers.write().remove(key);
    }

    fn refresh_watched(&self, prefix: &QueryKey) {
        let futures: Vec<(QueryKey, BoxFuture<'static, ()>)> = {
            let watchers = self.inner.watchers.read();
            watchers
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, refresher)| (key.clone(), refresher()))
                .collect()
        };
        if futures.is_empty() {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                for (key, fut) in futures {
                    debug!(key = %key, "refetching watched key after invalidation");
                    handle.spawn(fut);
                }
            }
            Err(_) => {
                warn!("invalidated outside a runtime; watched keys refresh on next access");
            }
        }
    }

    /// Total number of remote fetches issued since construction.
    pub fn fetch_count(&self) -> u64 {
        self.inner.fetch_count.load(Ordering::SeqCst)
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    /// Drop everything, including watched-key registrations.
    pub fn clear(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.entries.write().clear();
        self.inner.in_flight.lock().clear();
        self.inner.watchers.write().clear();
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
