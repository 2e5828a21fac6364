use crate::ports::{DeepClone, PersistableRepository, QueryRepository};
use chrono::NaiveDate;
use parking_lot::Mutex;
use shared::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::sleep;
use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub order_id: i32,
    pub order_date: NaiveDate,
}

impl Order {
    pub fn new(order_id: i32, day: u32) -> Self {
        Self {
            order_id,
            order_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        }
    }
}

// Nothing in an order is shared, so a field copy is already deep
impl DeepClone for Order {
    fn deep_clone(&self) -> Self {
        self.clone()
    }
}

/// Backing store that knows orders 1 to 3, counts its calls and can be told to fail
#[derive(Default)]
pub struct MockOrderRepository {
    get_calls: AtomicUsize,
    save_calls: AtomicUsize,
    fail_gets: AtomicBool,
    fail_saves: AtomicBool,
    load_delays: HashMap<i32, Duration>,
    saved: Mutex<HashMap<i32, Order>>,
}

impl MockOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_load_delay(mut self, key: i32, delay: Duration) -> Self {
        self.load_delays.insert(key, delay);
        self
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl QueryRepository<i32, Order> for MockOrderRepository {
    fn get(&self, key: &i32) -> Result<Option<Order>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.load_delays.get(key) {
            sleep(*delay);
        }

        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(Error::Storage("orders table unavailable".to_string()));
        }

        if let Some(order) = self.saved.lock().get(key) {
            return Ok(Some(order.clone()));
        }

        Ok(match *key {
            1..=3 => Some(Order::new(*key, 10 - *key as u32)),
            _ => None,
        })
    }
}

impl PersistableRepository<i32, Order> for MockOrderRepository {
    fn save(&self, key: &i32, entity: &Order) -> Result<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Storage("orders table is read-only".to_string()));
        }

        self.saved.lock().insert(*key, entity.clone());
        Ok(())
    }
}

/// Sweeps `sweep` until `done` holds. Expiry notifications trail the deadline by
/// up to one timer wheel tick, so a single sleep is not enough to observe them.
pub fn sweep_until(sweep: impl Fn(), done: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        sweep();
        if done() {
            return true;
        }
        sleep(Duration::from_millis(50));
    }
    false
}
