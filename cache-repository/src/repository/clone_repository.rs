use crate::domain::EntityKey;
use crate::ports::{DeepClone, PersistableRepository, QueryRepository, Repository};
use crate::repository::cache_repository::CacheRepository;
use shared::Result;
use shared::config::RepositoryConfig;
use std::sync::Arc;
use std::time::Duration;

/// Hands out deep copies of cached entities so callers can never mutate the
/// instance the cache holds.
///
/// Every `get` produces a new copy, even for repeated hits on the same key.
/// `save` borrows the caller's entity, which the caller remains free to mutate
/// afterwards, so the cache is given its own copy of it.
#[derive(Debug)]
pub struct CloneCacheRepository<R> {
    inner: R,
}

impl<R> CloneCacheRepository<R> {
    /// Wrap anything exposing the shared-entity repository capability
    pub fn wrap(inner: R) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<K, E, R> CloneCacheRepository<CacheRepository<K, E, R>>
where
    K: EntityKey,
    E: Send + Sync + 'static,
    R: Repository<K, E>,
{
    pub fn new(repository: R) -> Self {
        Self::wrap(CacheRepository::new(repository))
    }

    pub fn with_sliding_expiration(repository: R, sliding_expiration: Duration) -> Self {
        Self::wrap(CacheRepository::with_sliding_expiration(
            repository,
            sliding_expiration,
        ))
    }

    pub fn from_config(repository: R, config: &RepositoryConfig) -> Self {
        Self::wrap(CacheRepository::from_config(repository, config))
    }
}

impl<K, E, R> QueryRepository<K, E> for CloneCacheRepository<R>
where
    E: DeepClone,
    R: QueryRepository<K, Arc<E>>,
{
    fn get(&self, key: &K) -> Result<Option<E>> {
        Ok(self.inner.get(key)?.map(|entity| entity.deep_clone()))
    }
}

impl<K, E, R> PersistableRepository<K, E> for CloneCacheRepository<R>
where
    E: DeepClone,
    R: PersistableRepository<K, Arc<E>>,
{
    fn save(&self, key: &K, entity: &E) -> Result<()> {
        self.inner.save(key, &Arc::new(entity.deep_clone()))
    }
}
