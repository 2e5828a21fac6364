use cache_repository::{CacheKey, EntityKey, PersistableRepository, QueryRepository};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{Error, Result};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::path::Path;
use tracing::debug;

/// Sled-based backing repository storing entities as JSON under their rendered key
pub struct SledRepository<E> {
    db: sled::Db,
    _entity: PhantomData<fn() -> E>,
}

impl<E> SledRepository<E> {
    /// Open (or create) the database at `path`
    /// Creates the parent directory if it doesn't exist
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;
        }

        let db = sled::open(path)
            .map_err(|e| Error::Storage(format!("Failed to open Sled database: {}", e)))?;

        Ok(Self {
            db,
            _entity: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    fn render_key<K: EntityKey>(key: &K) -> Result<CacheKey> {
        key.cache_key()
            .ok_or(Error::InvalidArgument("key must not be null or zero"))
    }
}

impl<K, E> QueryRepository<K, E> for SledRepository<E>
where
    K: EntityKey,
    E: DeserializeOwned,
{
    fn get(&self, key: &K) -> Result<Option<E>> {
        let key = Self::render_key(key)?;
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| Error::Storage(format!("Failed to get entity: {}", e)))?;

        match value {
            Some(bytes) => {
                let entity = serde_json::from_slice(&bytes).map_err(|e| {
                    Error::Serialization(format!("Failed to deserialize entity: {}", e))
                })?;
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }
}

impl<K, E> PersistableRepository<K, E> for SledRepository<E>
where
    K: EntityKey,
    E: Serialize,
{
    fn save(&self, key: &K, entity: &E) -> Result<()> {
        let key = Self::render_key(key)?;
        let value = serde_json::to_vec(entity)
            .map_err(|e| Error::Serialization(format!("Failed to serialize entity: {}", e)))?;

        self.db
            .insert(key.as_bytes(), value)
            .map_err(|e| Error::Storage(format!("Failed to save entity: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| Error::Storage(format!("Failed to flush database: {}", e)))?;

        debug!(key = %key, "Persisted entity");
        Ok(())
    }
}

impl<E> Debug for SledRepository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledRepository")
            .field("entries", &self.db.len())
            .finish()
    }
}
