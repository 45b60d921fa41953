use dashmap::DashMap;
use shared::ProductId;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per product, so purchases of different products never
/// wait on each other.
#[derive(Default)]
pub struct ProductLocks {
    locks: DashMap<ProductId, Arc<Mutex<()>>>,
}

impl ProductLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, product_id: ProductId) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is released before awaiting.
        let lock = self
            .locks
            .entry(product_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
