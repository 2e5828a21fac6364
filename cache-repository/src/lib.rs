pub mod cache;
pub mod domain;
pub mod locks;
pub mod moka_store;
pub mod ports;
pub mod repository;

#[cfg(test)]
mod test_support;

pub use cache::EntityCache;
pub use domain::{CacheKey, EntityKey};
pub use locks::{KeyedLocks, LockHandle};
pub use moka_store::MokaExpiringStore;
pub use ports::{DeepClone, ExpiringStore, PersistableRepository, QueryRepository, Repository};
pub use repository::{CacheRepository, CloneCacheRepository};
