use cache_repository::{CacheKey, EntityKey, PersistableRepository, QueryRepository};
use dashmap::DashMap;
use shared::{Error, Result};
use std::fmt::Debug;

/// Process-local backing repository, mostly useful for tests and demos
pub struct InMemoryRepository<E> {
    entries: DashMap<CacheKey, E>,
}

impl<E> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn render_key<K: EntityKey>(key: &K) -> Result<CacheKey> {
    key.cache_key()
        .ok_or(Error::InvalidArgument("key must not be null or zero"))
}

impl<K, E> QueryRepository<K, E> for InMemoryRepository<E>
where
    K: EntityKey,
    E: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Result<Option<E>> {
        let key = render_key(key)?;
        Ok(self.entries.get(&key).map(|entry| entry.value().clone()))
    }
}

impl<K, E> PersistableRepository<K, E> for InMemoryRepository<E>
where
    K: EntityKey,
    E: Clone + Send + Sync,
{
    fn save(&self, key: &K, entity: &E) -> Result<()> {
        let key = render_key(key)?;
        self.entries.insert(key, entity.clone());
        Ok(())
    }
}

impl<E> Debug for InMemoryRepository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_get() {
        let repository = InMemoryRepository::new();

        repository.save(&1u32, &"one".to_string()).unwrap();

        let fetched: Option<String> = repository.get(&1u32).unwrap();
        assert_eq!(fetched.as_deref(), Some("one"));
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let repository: InMemoryRepository<String> = InMemoryRepository::new();
        assert!(repository.get(&"missing").unwrap().is_none());
        assert!(repository.is_empty());
    }

    #[test]
    fn test_save_overwrites() {
        let repository = InMemoryRepository::new();

        repository.save(&"key", &1u64).unwrap();
        repository.save(&"key", &2u64).unwrap();

        let fetched: Option<u64> = repository.get(&"key").unwrap();
        assert_eq!(fetched, Some(2));
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn test_null_key_is_rejected() {
        let repository: InMemoryRepository<u64> = InMemoryRepository::new();

        let get: Result<Option<u64>> = repository.get(&0u32);
        assert!(matches!(get, Err(Error::InvalidArgument(_))));
        assert!(matches!(
            repository.save(&String::new(), &1),
            Err(Error::InvalidArgument(_))
        ));
    }
}
