pub mod cache_repository;
pub mod clone_repository;

pub use cache_repository::CacheRepository;
pub use clone_repository::CloneCacheRepository;
