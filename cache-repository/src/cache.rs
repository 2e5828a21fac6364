use crate::locks::KeyedLocks;
use crate::moka_store::MokaExpiringStore;
use crate::ports::ExpiringStore;
use std::fmt::Debug;
use std::sync::Arc;

/// The cache state a repository works against: an expiring store plus the lock
/// registry its evictions clean up.
///
/// Cloning is cheap and yields a handle to the same state, so several repositories
/// fronting the same logical entities can coordinate through one instance.
pub struct EntityCache<E>
where
    E: Send + Sync + 'static,
{
    store: Arc<dyn ExpiringStore<Arc<E>>>,
    locks: Arc<KeyedLocks>,
}

impl<E> EntityCache<E>
where
    E: Send + Sync + 'static,
{
    /// Create a moka-backed cache whose expiry evictions release lock handles
    pub fn new() -> Self {
        let locks = Arc::new(KeyedLocks::new());
        let registry = Arc::clone(&locks);
        let store: MokaExpiringStore<Arc<E>> = MokaExpiringStore::new(move |key| {
            registry.release_on_eviction(key);
        });

        Self {
            store: Arc::new(store),
            locks,
        }
    }

    /// Assemble a cache from an existing store and registry. The store's eviction
    /// hook is expected to already call [`KeyedLocks::release_on_eviction`].
    pub fn from_parts(store: Arc<dyn ExpiringStore<Arc<E>>>, locks: Arc<KeyedLocks>) -> Self {
        Self { store, locks }
    }

    pub fn store(&self) -> &dyn ExpiringStore<Arc<E>> {
        self.store.as_ref()
    }

    pub fn locks(&self) -> &KeyedLocks {
        &self.locks
    }

    /// Evict whatever has expired now, releasing the matching lock handles
    pub fn sweep(&self) {
        self.store.sweep();
    }
}

impl<E> Default for EntityCache<E>
where
    E: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EntityCache<E>
where
    E: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<E> Debug for EntityCache<E>
where
    E: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache")
            .field("entries", &self.store.entry_count())
            .field("lock_handles", &self.locks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CacheKey;
    use crate::test_support::sweep_until;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_expiry_releases_lock_handle() {
        let cache: EntityCache<String> = EntityCache::new();
        let key = CacheKey::from("1");

        drop(cache.locks().acquire_handle(&key));
        cache
            .store()
            .put(key.clone(), Some(Arc::new("one".to_string())), Duration::from_millis(100));
        assert_eq!(cache.locks().len(), 1);

        sleep(Duration::from_millis(300));

        assert!(sweep_until(|| cache.sweep(), || cache.locks().is_empty()));
        assert_eq!(cache.store().entry_count(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let cache: EntityCache<String> = EntityCache::new();
        let shared = cache.clone();
        let key = CacheKey::from("1");

        cache
            .store()
            .put(key.clone(), Some(Arc::new("one".to_string())), Duration::from_secs(60));

        let seen = shared.store().get(&key).unwrap();
        assert_eq!(seen.as_str(), "one");
        assert!(Arc::ptr_eq(&seen, &cache.store().get(&key).unwrap()));
    }
}
