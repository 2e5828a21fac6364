use crate::domain::CacheKey;
use crate::ports::ExpiringStore;
use moka::Expiry;
use moka::notification::RemovalCause;
use moka::sync::Cache;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// A cached value together with the window it slides by
#[derive(Clone)]
struct Slot<V> {
    value: V,
    sliding_expiration: Duration,
}

/// Restarts an entry's window on creation, on replacement and on every read
struct SlidingExpiry;

impl<V> Expiry<CacheKey, Slot<V>> for SlidingExpiry {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        slot: &Slot<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(slot.sliding_expiration)
    }

    fn expire_after_read(
        &self,
        _key: &CacheKey,
        slot: &Slot<V>,
        _read_at: Instant,
        _duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        Some(slot.sliding_expiration)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        slot: &Slot<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(slot.sliding_expiration)
    }
}

/// Moka-based sliding expiration store.
///
/// Expired entries are evicted lazily during moka's housekeeping, which runs as
/// part of ordinary reads and writes, or on demand through [`ExpiringStore::sweep`].
/// The eviction hook only fires for expiry; explicit removal and replacement are
/// not evictions.
pub struct MokaExpiringStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    cache: Cache<CacheKey, Slot<V>>,
}

impl<V> MokaExpiringStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an unbounded store that calls `on_evict` once for every expired key
    pub fn new<F>(on_evict: F) -> Self
    where
        F: Fn(&CacheKey) + Send + Sync + 'static,
    {
        let cache: Cache<CacheKey, Slot<V>> = Cache::builder()
            .expire_after(SlidingExpiry)
            .eviction_listener(move |key: Arc<CacheKey>, _slot, cause| {
                if cause == RemovalCause::Expired {
                    debug!(key = %key, "Cache entry expired");
                    on_evict(&key);
                }
            })
            .build();

        Self { cache }
    }

    pub fn without_eviction_hook() -> Self {
        Self::new(|_| {})
    }
}

impl<V> ExpiringStore<V> for MokaExpiringStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn put(&self, key: CacheKey, value: Option<V>, sliding_expiration: Duration) {
        match value {
            Some(value) => self.cache.insert(
                key,
                Slot {
                    value,
                    sliding_expiration,
                },
            ),
            None => self.cache.invalidate(&key),
        }
    }

    fn get(&self, key: &CacheKey) -> Option<V> {
        self.cache.get(key).map(|slot| slot.value)
    }

    fn remove(&self, key: &CacheKey) {
        self.cache.invalidate(key);
    }

    fn sweep(&self) {
        self.cache.run_pending_tasks();
    }

    fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl<V> Debug for MokaExpiringStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaExpiringStore")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
