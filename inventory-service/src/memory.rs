//! In-process inventory and history, for running without Postgres.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use shared::{InventoryRecord, NewPurchaseHistoryEntry, ProductId, PurchaseHistoryEntry};
use tokio::sync::RwLock;
use crate::history::PurchaseHistoryLog;
use crate::store::{Decrement, InventoryStore};

#[derive(Default)]
pub struct MemoryInventoryStore {
    stock: DashMap<ProductId, i64>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stock.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stock.is_empty()
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn find(&self, product_id: ProductId) -> Result<Option<InventoryRecord>> {
        Ok(self.stock.get(&product_id).map(|quantity| InventoryRecord {
            product_id,
            quantity: *quantity,
        }))
    }

    async fn get_or_create(&self, product_id: ProductId) -> Result<InventoryRecord> {
        let quantity = *self.stock.entry(product_id).or_insert(0);
        Ok(InventoryRecord { product_id, quantity })
    }

    async fn update(&self, product_id: ProductId, quantity: i64) -> Result<InventoryRecord> {
        self.stock.insert(product_id, quantity);
        Ok(InventoryRecord { product_id, quantity })
    }

    async fn decrement(&self, product_id: ProductId, amount: i64) -> Result<Decrement> {
        // The shard stays write-locked for as long as `current` is held.
        let mut current = match self.stock.get_mut(&product_id) {
            Some(current) => current,
            None => return Ok(Decrement::Missing),
        };

        if *current < amount {
            return Ok(Decrement::Insufficient { available: *current });
        }

        *current -= amount;
        Ok(Decrement::Applied(InventoryRecord {
            product_id,
            quantity: *current,
        }))
    }

    async fn restock(&self, product_id: ProductId, amount: i64) -> Result<InventoryRecord> {
        let mut current = self.stock.entry(product_id).or_insert(0);
        *current += amount;
        Ok(InventoryRecord {
            product_id,
            quantity: *current,
        })
    }
}

#[derive(Default)]
pub struct MemoryPurchaseHistoryLog {
    entries: RwLock<Vec<PurchaseHistoryEntry>>,
}

impl MemoryPurchaseHistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<PurchaseHistoryEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl PurchaseHistoryLog for MemoryPurchaseHistoryLog {
    async fn append(&self, entry: NewPurchaseHistoryEntry) -> Result<i64> {
        let mut entries = self.entries.write().await;
        let id = entries.len() as i64 + 1;
        entries.push(entry.with_id(id));
        Ok(id)
    }

    async fn for_product(&self, product_id: ProductId) -> Result<Vec<PurchaseHistoryEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|entry| entry.product_id == product_id)
            .cloned()
            .collect())
    }
}
