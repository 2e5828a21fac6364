use crate::domain::CacheKey;
use shared::Result;
use std::sync::Arc;
use std::time::Duration;

// Ports are the pluggable seams between the caching core and whatever sits behind it

/// Read side of a key addressable store
pub trait QueryRepository<K, E>: Send + Sync {
    /// Returns `Ok(None)` when nothing is stored under `key`
    fn get(&self, key: &K) -> Result<Option<E>>;
}

/// Write side of a key addressable store
pub trait PersistableRepository<K, E>: Send + Sync {
    fn save(&self, key: &K, entity: &E) -> Result<()>;
}

/// Full get/save capability. Backing stores and every caching layer expose it,
/// so layers can be stacked on top of each other.
pub trait Repository<K, E>: QueryRepository<K, E> + PersistableRepository<K, E> {}

impl<K, E, T> Repository<K, E> for T where T: QueryRepository<K, E> + PersistableRepository<K, E> {}

impl<K, E, T> QueryRepository<K, E> for Arc<T>
where
    T: QueryRepository<K, E> + ?Sized,
{
    fn get(&self, key: &K) -> Result<Option<E>> {
        (**self).get(key)
    }
}

impl<K, E, T> PersistableRepository<K, E> for Arc<T>
where
    T: PersistableRepository<K, E> + ?Sized,
{
    fn save(&self, key: &K, entity: &E) -> Result<()> {
        (**self).save(key, entity)
    }
}

/// Port for a sliding-expiration key/value store.
///
/// Every successful `get` restarts the entry's expiration window. When a
/// window elapses the entry is evicted and the store's eviction hook is
/// invoked exactly once with the evicted key.
pub trait ExpiringStore<V>: Send + Sync {
    /// Replaces any entry for `key`. A `None` value removes the entry instead.
    fn put(&self, key: CacheKey, value: Option<V>, sliding_expiration: Duration);

    fn get(&self, key: &CacheKey) -> Option<V>;

    fn remove(&self, key: &CacheKey);

    /// Runs pending housekeeping so elapsed entries are evicted now rather than lazily.
    fn sweep(&self);

    fn entry_count(&self) -> u64;
}

/// Produces an independent copy of an entity, sharing no mutable state with the original.
///
/// Types whose `Clone` already copies everything they own can simply delegate to
/// it. Types holding shared interior state (`Arc<Mutex<_>>` and friends) must copy
/// that state recursively.
pub trait DeepClone {
    fn deep_clone(&self) -> Self;
}
