//! Backing repositories the caching layers can sit in front of.

pub mod memory_store;
pub mod sled_store;

pub use memory_store::InMemoryRepository;
pub use sled_store::SledRepository;
