//! Cache Store Module
//!
//! Generic key/value store whose entries expire after sitting idle for longer
//! than a configured TTL. A background sweep task does the expiring.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats};
use crate::tasks::{spawn_sweep_task, Sweep, SweepHandle};

/// Disposal callback run with every value that leaves the cache through
/// overwrite, expiry or close.
pub type EvictFn<V> = Box<dyn Fn(V) + Send + Sync + 'static>;

// == Shared State ==
struct CacheState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    stats: CacheStats,
    closed: bool,
}

/// The part of the cache reachable from the sweep task.
struct CacheShared<K, V> {
    state: RwLock<CacheState<K, V>>,
    ttl: Duration,
    on_evict: Option<EvictFn<V>>,
}

impl<K, V> CacheShared<K, V> {
    fn dispose(&self, value: V) {
        if let Some(on_evict) = &self.on_evict {
            on_evict(value);
        }
    }

    /// Empties the store, disposing of every value, and marks it closed.
    fn drain(&self) -> usize {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.closed = true;

        let entries = std::mem::take(&mut state.entries);
        let count = entries.len();
        for (_, entry) in entries {
            state.stats.record_eviction();
            self.dispose(entry.value);
        }
        state.stats.set_total_entries(0);
        count
    }
}

impl<K, V> Sweep for CacheShared<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn label(&self) -> &'static str {
        "cache"
    }

    /// Removes every entry idle for longer than the TTL.
    ///
    /// The write lock is held for the whole pass, so no caller can see an
    /// entry that has already been handed to the disposal callback.
    fn sweep(&self) -> usize {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let now = Instant::now();

        let idle_keys: Vec<K> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_idle(now, self.ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &idle_keys {
            if let Some(entry) = state.entries.remove(key) {
                state.stats.record_expiration();
                self.dispose(entry.value);
            }
        }

        state.stats.set_total_entries(state.entries.len());
        idle_keys.len()
    }
}

// == Expiring Cache ==
/// Thread-safe key/value cache with idle-time expiry.
///
/// Every `get` and `set` refreshes the entry's last-access time. A background
/// task started by the constructor wakes every `sweep_interval` and evicts
/// entries idle for longer than `ttl`, so an entry can outlive its TTL by up to
/// one sweep interval.
///
/// The disposal callback runs while the store's write lock is held. It must be
/// quick and must not call back into the same cache.
///
/// Values owning external resources should be released with [`close`]. If the
/// cache is dropped without being closed, the remaining values are still
/// passed to the disposal callback from `Drop`.
///
/// [`close`]: ExpiringCache::close
pub struct ExpiringCache<K, V> {
    shared: Arc<CacheShared<K, V>>,
    sweeper: Mutex<Option<SweepHandle>>,
    sweep_interval: Duration,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache without a disposal callback and starts its sweep task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Arguments
    /// * `sweep_interval` - Time between sweep passes
    /// * `ttl` - Maximum idle time before an entry is evicted
    pub fn new(sweep_interval: Duration, ttl: Duration) -> Self {
        Self::build(sweep_interval, ttl, None)
    }

    /// Creates a cache that hands evicted values to `on_evict`.
    ///
    /// # Arguments
    /// * `sweep_interval` - Time between sweep passes
    /// * `ttl` - Maximum idle time before an entry is evicted
    /// * `on_evict` - Called with each value leaving the cache
    pub fn with_evict<F>(sweep_interval: Duration, ttl: Duration, on_evict: F) -> Self
    where
        F: Fn(V) + Send + Sync + 'static,
    {
        Self::build(sweep_interval, ttl, Some(Box::new(on_evict)))
    }

    fn build(sweep_interval: Duration, ttl: Duration, on_evict: Option<EvictFn<V>>) -> Self {
        let shared = Arc::new(CacheShared {
            state: RwLock::new(CacheState {
                entries: HashMap::new(),
                stats: CacheStats::new(),
                closed: false,
            }),
            ttl,
            on_evict,
        });

        let sweeper = spawn_sweep_task(Arc::downgrade(&shared), sweep_interval);

        Self {
            shared,
            sweeper: Mutex::new(Some(sweeper)),
            sweep_interval,
        }
    }

    // == Get ==
    /// Returns a clone of the value stored under `key`, if any.
    ///
    /// A hit refreshes the entry's last-access time.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut guard = self.shared.state.write();
        let state = &mut *guard;

        match state.entries.get_mut(key) {
            Some(entry) => {
                entry.touch();
                let value = entry.value.clone();
                state.stats.record_hit();
                Some(value)
            }
            None => {
                state.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Inserts or overwrites the value for `key`.
    ///
    /// An overwritten value goes to the disposal callback before it is
    /// replaced. After [`close`](Self::close) nothing is inserted any more;
    /// the value is disposed of straight away.
    pub fn set(&self, key: K, value: V) {
        let mut guard = self.shared.state.write();

        if guard.closed {
            drop(guard);
            warn!("Insert into closed cache ignored");
            self.shared.dispose(value);
            return;
        }

        let state = &mut *guard;
        if let Some(entry) = state.entries.get_mut(&key) {
            let previous = entry.replace(value);
            state.stats.record_eviction();
            self.shared.dispose(previous);
        } else {
            state.entries.insert(key, CacheEntry::new(value));
            let count = state.entries.len();
            state.stats.set_total_entries(count);
        }
    }

    // == Delete ==
    /// Removes `key` and hands its value back to the caller.
    ///
    /// The disposal callback is not run: the caller now owns the value and is
    /// responsible for releasing it.
    pub fn delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.shared.state.write();
        let removed = state.entries.remove(key).map(|entry| entry.value);
        let count = state.entries.len();
        state.stats.set_total_entries(count);
        removed
    }

    // == Close ==
    /// Stops the sweep task, then evicts every remaining entry through the
    /// disposal callback.
    ///
    /// The cache stays empty afterwards: later inserts are disposed of
    /// immediately. Closing twice is a no-op.
    pub async fn close(&self) {
        let sweeper = self.sweeper.lock().take();
        let Some(sweeper) = sweeper else {
            return;
        };

        sweeper.stop().await;

        let evicted = self.shared.drain();
        debug!("Cache closed, {} entries evicted", evicted);
    }

    // == Sweep Now ==
    /// Runs one sweep pass on the caller's thread and returns the number of
    /// entries removed.
    pub fn sweep_now(&self) -> usize {
        self.shared.sweep()
    }

    // == Contains Key ==
    /// Checks for `key` without touching its last-access time or the stats.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.state.read().entries.contains_key(key)
    }
}

impl<K, V> ExpiringCache<K, V> {
    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.shared.state.read();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.shared.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.state.read().entries.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.read().closed
    }

    pub fn ttl(&self) -> Duration {
        self.shared.ttl
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }
}

impl<K, V> Drop for ExpiringCache<K, V> {
    fn drop(&mut self) {
        // The sweep task sees its handle dropped and exits on its own
        if !self.shared.state.read().closed {
            self.shared.drain();
        }
    }
}

impl<K, V> fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.read();
        f.debug_struct("ExpiringCache")
            .field("entries", &state.entries.len())
            .field("ttl", &self.shared.ttl)
            .field("sweep_interval", &self.sweep_interval)
            .field("closed", &state.closed)
            .finish()
    }
}
