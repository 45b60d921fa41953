//! Test doubles shared by the unit tests.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use serde_json::json;
use shared::{NewPurchaseHistoryEntry, ProductId, ProductInfo, PurchaseHistoryEntry, PurchaseStatus};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use crate::history::PurchaseHistoryLog;
use crate::memory::MemoryPurchaseHistoryLog;
use crate::product_client::{ProductCatalog, ProductLookup};

/// Catalog that knows a fixed set of products.
#[derive(Default)]
pub struct StaticCatalog {
    known: DashSet<ProductId>,
    delays: DashMap<ProductId, Duration>,
    unavailable: AtomicBool,
    calls: AtomicUsize,
}

impl StaticCatalog {
    pub fn new(known: &[ProductId]) -> Self {
        let catalog = Self::default();
        for id in known {
            catalog.known.insert(*id);
        }
        catalog
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_delay(&self, product_id: ProductId, delay: Duration) {
        self.delays.insert(product_id, delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductCatalog for StaticCatalog {
    async fn lookup(&self, product_id: ProductId) -> ProductLookup {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.get(&product_id).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return ProductLookup::Unavailable("catalog down".to_string());
        }
        if self.known.contains(&product_id) {
            ProductLookup::Found(ProductInfo(json!({ "id": product_id })))
        } else {
            ProductLookup::NotFound
        }
    }
}

pub struct FailingHistoryLog;

#[async_trait]
impl PurchaseHistoryLog for FailingHistoryLog {
    async fn append(&self, _entry: NewPurchaseHistoryEntry) -> Result<i64> {
        anyhow::bail!("history table is gone")
    }

    async fn for_product(&self, _product_id: ProductId) -> Result<Vec<PurchaseHistoryEntry>> {
        anyhow::bail!("history table is gone")
    }
}

/// Writes rejected attempts but fails on every successful one.
#[derive(Default)]
pub struct SuccessRejectingHistoryLog {
    pub inner: MemoryPurchaseHistoryLog,
}

#[async_trait]
impl PurchaseHistoryLog for SuccessRejectingHistoryLog {
    async fn append(&self, entry: NewPurchaseHistoryEntry) -> Result<i64> {
        if entry.status == PurchaseStatus::Success {
            anyhow::bail!("connection reset while inserting history");
        }
        self.inner.append(entry).await
    }

    async fn for_product(&self, product_id: ProductId) -> Result<Vec<PurchaseHistoryEntry>> {
        self.inner.for_product(product_id).await
    }
}
