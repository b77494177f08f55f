//! Time- and size-bounded in-memory cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::config::CacheConfig;
use crate::entry::Entry;

struct Store<V> {
    entries: HashMap<String, Entry<V>>,
    /// Next insertion stamp.
    next_seq: u64,
    /// Handle for the pending collection sweep, if one is scheduled.
    gc_timer: Option<AbortHandle>,
}

impl<V> Store<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_seq: 0,
            gc_timer: None,
        }
    }

    /// Remove every expired entry.
    fn sweep(&mut self) {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("Collected {} expired cache entries", removed);
        }
    }
}

/// In-memory cache with per-entry expiry, scheduled collection sweeps and
/// an oldest-first capacity bound.
///
/// Values are opaque to the cache and cloned out on read; nothing is
/// serialized. Expired entries are removed lazily when read and in bulk by
/// [`collect`](Cache::collect), which every successful store schedules once
/// if no sweep is already pending.
///
/// Handles are cheap to clone and share one store.
pub struct Cache<V> {
    config: CacheConfig,
    store: Arc<Mutex<Store<V>>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            store: self.store.clone(),
        }
    }
}

impl<V: Clone + Send + 'static> Cache<V> {
    /// Create a cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            store: Arc::new(Mutex::new(Store::new())),
        }
    }

    /// Store a value under `key` for `lifetime`.
    ///
    /// Lifetimes shorter than one millisecond store nothing and leave any
    /// existing entry untouched. Overwriting a live key keeps its original
    /// insertion position. Each successful store guarantees one collection
    /// sweep within the configured interval, then enforces the capacity
    /// bound.
    pub async fn set(&self, key: &str, value: V, lifetime: Duration) {
        if lifetime < Duration::from_millis(1) {
            debug!("Discarding cache store for {} (lifetime below 1ms)", key);
            return;
        }
        let mut store = self.store.lock().await;
        let expires_at = Instant::now() + lifetime;
        let seq = match store.entries.get(key) {
            Some(existing) => existing.seq,
            None => {
                let seq = store.next_seq;
                store.next_seq += 1;
                seq
            }
        };
        store.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at,
                seq,
            },
        );
        debug!("Stored cache entry {} (expires in {:?})", key, lifetime);

        if store.gc_timer.is_none() {
            store.gc_timer = Some(self.spawn_collect());
        }
        self.trim(&mut store);
    }

    /// Fetch the value stored under `key`.
    ///
    /// Expired entries read as absent and are removed on the way out.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut store = self.store.lock().await;
        let expired = store
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(Instant::now()));
        if expired {
            store.entries.remove(key);
            debug!("Expired cache entry {} removed on read", key);
            return None;
        }
        store.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Remove the entry stored under `key`, if any.
    pub async fn remove(&self, key: &str) {
        let mut store = self.store.lock().await;
        if store.entries.remove(key).is_some() {
            debug!("Removed cache entry {}", key);
        }
    }

    /// Remove every entry and cancel any pending collection sweep.
    pub async fn clear(&self) {
        let mut store = self.store.lock().await;
        if let Some(handle) = store.gc_timer.take() {
            handle.abort();
        }
        store.entries.clear();
        debug!("Cleared cache");
    }

    /// Remove every expired entry.
    ///
    /// Runs on the sweep scheduled by [`set`](Cache::set) and may also be
    /// called directly. Never reschedules itself; each store ensures one
    /// future sweep is pending.
    pub async fn collect(&self) {
        let mut store = self.store.lock().await;
        store.sweep();
    }

    /// Number of stored entries, including expired ones not yet collected.
    pub async fn len(&self) -> usize {
        self.store.lock().await.entries.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.entries.is_empty()
    }

    /// Spawn the one-shot sweep a store guarantees. The sweep releases the
    /// timer slot before collecting, so the next store schedules anew.
    fn spawn_collect(&self) -> AbortHandle {
        let this = self.clone();
        let interval = self.config.collect_interval();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            let mut store = this.store.lock().await;
            store.gc_timer = None;
            store.sweep();
        });
        handle.abort_handle()
    }

    /// Enforce the capacity bound, evicting oldest-inserted entries first.
    fn trim(&self, store: &mut Store<V>) {
        let max = self.config.max_entries;
        if max == 0 || store.entries.len() <= max {
            return;
        }
        // Trim to one below the cap so the next store does not immediately
        // trim again, but never evict the entry just inserted.
        let excess = (store.entries.len() - max + 1).min(store.entries.len() - 1);
        let mut oldest: Vec<(String, u64)> = store
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.seq))
            .collect();
        oldest.sort_by_key(|(_, seq)| *seq);
        for (key, _) in oldest.into_iter().take(excess) {
            store.entries.remove(&key);
            debug!("Evicted cache entry {} (over capacity)", key);
        }
    }
}

impl<V: Clone + Send + 'static> Default for Cache<V> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
