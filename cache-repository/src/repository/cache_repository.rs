use crate::cache::EntityCache;
use crate::domain::{CacheKey, EntityKey};
use crate::ports::{PersistableRepository, QueryRepository, Repository};
use shared::config::RepositoryConfig;
use shared::{Error, Result};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Cache-aside reads and write-through saves in front of a backing repository.
///
/// Loads and saves for the same key are serialized through that key's lock handle,
/// so concurrent misses trigger a single backing-store load. Different keys never
/// wait on each other. Cached entities are shared: every hit hands out the same
/// `Arc` the cache holds.
pub struct CacheRepository<K, E, R>
where
    E: Send + Sync + 'static,
{
    repository: R,
    cache: EntityCache<E>,
    sliding_expiration: Duration,
    _key: PhantomData<fn(&K)>,
}

impl<K, E, R> CacheRepository<K, E, R>
where
    K: EntityKey,
    E: Send + Sync + 'static,
    R: Repository<K, E>,
{
    /// Create a repository with a private cache and the default five minute window
    pub fn new(repository: R) -> Self {
        Self::with_sliding_expiration(repository, RepositoryConfig::DEFAULT_SLIDING_EXPIRATION)
    }

    pub fn with_sliding_expiration(repository: R, sliding_expiration: Duration) -> Self {
        Self::with_cache(repository, EntityCache::new(), sliding_expiration)
    }

    pub fn from_config(repository: R, config: &RepositoryConfig) -> Self {
        Self::with_sliding_expiration(repository, config.sliding_expiration)
    }

    /// Create a repository over an existing cache, shared with other repositories
    /// that front the same entities
    pub fn with_cache(repository: R, cache: EntityCache<E>, sliding_expiration: Duration) -> Self {
        Self {
            repository,
            cache,
            sliding_expiration,
            _key: PhantomData,
        }
    }

    pub fn sliding_expiration(&self) -> Duration {
        self.sliding_expiration
    }

    pub fn cache(&self) -> &EntityCache<E> {
        &self.cache
    }

    pub fn cached_entries(&self) -> u64 {
        self.cache.store().entry_count()
    }

    fn render_key(key: &K) -> Result<CacheKey> {
        key.cache_key()
            .ok_or(Error::InvalidArgument("key must not be null or zero"))
    }

    /// Replaces whatever is cached for `key`; the old entry is removed first
    fn set_cached_entity(&self, key: CacheKey, entity: Option<Arc<E>>) {
        let store = self.cache.store();
        store.remove(&key);
        store.put(key, entity, self.sliding_expiration);
    }
}

impl<K, E, R> QueryRepository<K, Arc<E>> for CacheRepository<K, E, R>
where
    K: EntityKey,
    E: Send + Sync + 'static,
    R: Repository<K, E>,
{
    fn get(&self, key: &K) -> Result<Option<Arc<E>>> {
        let cache_key = Self::render_key(key)?;
        let handle = self.cache.locks().acquire_handle(&cache_key);
        let guard = handle.lock();

        if let Some(cached) = self.cache.store().get(&cache_key) {
            trace!(key = %cache_key, "Cache hit");
            return Ok(Some(cached));
        }

        debug!(key = %cache_key, "Cache miss, loading from backing repository");
        let entity = match self.repository.get(key) {
            Ok(Some(entity)) => Arc::new(entity),
            outcome => {
                match &outcome {
                    Ok(_) => debug!(key = %cache_key, "Entity not found in backing repository"),
                    Err(error) => warn!(key = %cache_key, %error, "Backing repository load failed"),
                }

                // Nothing got cached, so no eviction will ever come to reclaim the handle
                drop(guard);
                drop(handle);
                self.cache.locks().release_on_eviction(&cache_key);
                return outcome.map(|_| None);
            }
        };

        self.set_cached_entity(cache_key, Some(Arc::clone(&entity)));
        Ok(Some(entity))
    }
}

impl<K, E, R> PersistableRepository<K, Arc<E>> for CacheRepository<K, E, R>
where
    K: EntityKey,
    E: Send + Sync + 'static,
    R: Repository<K, E>,
{
    fn save(&self, key: &K, entity: &Arc<E>) -> Result<()> {
        let cache_key = Self::render_key(key)?;
        let handle = self.cache.locks().acquire_handle(&cache_key);
        let guard = handle.lock();

        // The cache must never reflect a state the backing repository rejected
        if let Err(error) = self.repository.save(key, entity.as_ref()) {
            warn!(key = %cache_key, %error, "Backing repository save failed, cache left untouched");

            // The key may have no entry, or its entry may have expired while we held
            // the handle; either way no eviction is left to reclaim it
            drop(guard);
            drop(handle);
            self.cache.locks().release_on_eviction(&cache_key);
            return Err(error);
        }

        debug!(key = %cache_key, "Saved entity, refreshing cache entry");
        self.set_cached_entity(cache_key, Some(Arc::clone(entity)));
        Ok(())
    }
}

impl<K, E, R> Debug for CacheRepository<K, E, R>
where
    E: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRepository")
            .field("sliding_expiration", &self.sliding_expiration)
            .field("cache", &self.cache)
            .finish()
    }
}
