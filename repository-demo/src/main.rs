mod order;

use cache_repository::{
    CacheRepository, CloneCacheRepository, PersistableRepository, QueryRepository,
};
use order::{CountingRepository, Order};
use shared::config::RepositoryConfig;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use storage_engine::SledRepository;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type Orders = CloneCacheRepository<
    CacheRepository<u32, Order, Arc<CountingRepository<SledRepository<Order>>>>,
>;

/// Windows longer than this are not waited out by the demo
const MAX_DEMO_WAIT: Duration = Duration::from_secs(10);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting cache repository demo");

    // Load environment variables
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = RepositoryConfig::from_env();
    info!(
        sliding_expiration = ?config.sliding_expiration,
        data_dir = %config.data_dir,
        "Configuration loaded"
    );

    let sled = SledRepository::new(Path::new(&config.data_dir).join("orders.sled"))?;
    seed_orders(&sled)?;

    let backing = Arc::new(CountingRepository::new(sled));
    let orders: Arc<Orders> = Arc::new(CloneCacheRepository::from_config(
        Arc::clone(&backing),
        &config,
    ));

    let order = orders.get(&1)?;
    info!(?order, loads = backing.loads(), "First read of order 1");

    let order = orders.get(&1)?;
    info!(?order, loads = backing.loads(), "Second read of order 1 served from cache");

    if config.sliding_expiration <= MAX_DEMO_WAIT {
        thread::sleep(config.sliding_expiration + Duration::from_secs(1));
        let order = orders.get(&1)?;
        info!(?order, loads = backing.loads(), "Read of order 1 after expiry");
    } else {
        info!("Skipping expiry step, set CACHE_REPOSITORY_SLIDING_EXPIRATION_SECS=5 to see it");
    }

    for attempt in 1..=2 {
        let order = orders.get(&3)?;
        info!(?order, attempt, loads = backing.loads(), "Absent orders are never cached");
    }

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let orders = Arc::clone(&orders);
            thread::spawn(move || orders.get(&2))
        })
        .collect();
    for reader in readers {
        match reader.join() {
            Ok(result) => {
                result?;
            }
            Err(_) => warn!("Reader thread panicked"),
        }
    }
    info!(loads = backing.loads(), "Concurrent readers of order 2 shared one load");

    let mut updated = Order::placed_days_ago(2);
    updated.order_date = updated.order_date.pred_opt().unwrap_or(updated.order_date);
    orders.save(&2, &updated)?;
    let order = orders.get(&2)?;
    info!(?order, loads = backing.loads(), "Saved order 2 is served from cache");

    if let Err(error) = orders.get(&0) {
        info!(%error, "Null keys are rejected");
    }

    Ok(())
}

fn seed_orders(sled: &SledRepository<Order>) -> shared::Result<()> {
    if !sled.is_empty() {
        return Ok(());
    }

    info!("Seeding orders 1 and 2");
    for order_id in [1u32, 2] {
        sled.save(&order_id, &Order::placed_days_ago(order_id))?;
    }
    Ok(())
}
