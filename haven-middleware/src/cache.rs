use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lru::LruCache;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    created_at: Instant,
}

impl<V> Entry<V> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() < ttl
    }
}

/// Capacity-bounded in-memory store whose entries expire `ttl` after they were written.
///
/// Expiry is lazy: a stale entry is removed by the next [`get`](Self::get) for
/// its key and never by a background sweep. When full, a write evicts the
/// least recently used entry. Writes overwrite unconditionally, so two
/// overlapping writers for one key resolve to the last one.
pub struct TtlCache<K, V> {
    inner: Mutex<LruCache<K, Entry<V>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Create an empty cache holding at most `capacity` entries.
    ///
    /// A zero `ttl` disables caching. A zero `capacity` is treated as one.
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
            ttl,
        }
    }

    /// Maximum number of entries held at once.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    /// Configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    // Poisoning is ignored: entries are replaced whole, never written partially.
    fn lock(&self) -> MutexGuard<'_, LruCache<K, Entry<V>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return a clone of the value for `key` if it is still fresh.
    ///
    /// A stale entry is evicted and reported as absent.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut guard = self.lock();
        if let Some(entry) = guard.get(key)
            && entry.is_fresh(self.ttl)
        {
            return Some(entry.value.clone());
        }
        guard.pop(key);
        None
    }

    /// Store `value` under `key`, replacing any previous entry and restarting its TTL.
    pub fn set(&self, key: K, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        let entry = Entry {
            value,
            created_at: Instant::now(),
        };
        self.lock().put(key, entry);
    }

    /// Drop the entry for `key`, if any.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.lock().pop(key).map(|e| e.value)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of entries held, including stale ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
