use cache_repository::{DeepClone, PersistableRepository, QueryRepository};
use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::Result;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: u32,
    pub order_date: NaiveDate,
}

impl Order {
    /// An order placed `order_id` days ago
    pub fn placed_days_ago(order_id: u32) -> Self {
        let today = Local::now().date_naive();
        Self {
            order_id,
            order_date: today
                .checked_sub_days(Days::new(order_id.into()))
                .unwrap_or(today),
        }
    }
}

impl DeepClone for Order {
    fn deep_clone(&self) -> Self {
        self.clone()
    }
}

/// Counts the loads reaching the wrapped repository
pub struct CountingRepository<R> {
    inner: R,
    loads: AtomicUsize,
}

impl<R> CountingRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl<K, E, R> QueryRepository<K, E> for CountingRepository<R>
where
    R: QueryRepository<K, E>,
{
    fn get(&self, key: &K) -> Result<Option<E>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }
}

impl<K, E, R> PersistableRepository<K, E> for CountingRepository<R>
where
    R: PersistableRepository<K, E>,
{
    fn save(&self, key: &K, entity: &E) -> Result<()> {
        self.inner.save(key, entity)
    }
}
