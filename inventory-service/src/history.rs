use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use shared::{NewPurchaseHistoryEntry, ProductId, PurchaseHistoryEntry};
use crate::models::{NewPurchaseHistory, PurchaseHistory};
use crate::schema::purchase_history;
use crate::DbPool;

/// Append-only audit trail of purchase attempts.
#[async_trait]
pub trait PurchaseHistoryLog: Send + Sync {
    /// Persists the entry and returns its assigned id.
    async fn append(&self, entry: NewPurchaseHistoryEntry) -> Result<i64>;

    /// Entries for one product, oldest first.
    async fn for_product(&self, product_id: ProductId) -> Result<Vec<PurchaseHistoryEntry>>;
}

pub struct PgPurchaseHistoryLog {
    pool: DbPool,
}

impl PgPurchaseHistoryLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PurchaseHistoryLog for PgPurchaseHistoryLog {
    async fn append(&self, entry: NewPurchaseHistoryEntry) -> Result<i64> {
        let mut conn = self.pool.get().await?;

        let id = diesel::insert_into(purchase_history::table)
            .values(&NewPurchaseHistory::from(&entry))
            .returning(purchase_history::id)
            .get_result::<i64>(&mut conn)
            .await?;

        Ok(id)
    }

    async fn for_product(&self, product_id: ProductId) -> Result<Vec<PurchaseHistoryEntry>> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<PurchaseHistory> = purchase_history::table
            .filter(purchase_history::product_id.eq(product_id))
            .order(purchase_history::id.asc())
            .select(PurchaseHistory::as_select())
            .load(&mut conn)
            .await?;

        rows.into_iter().map(PurchaseHistoryEntry::try_from).collect()
    }
}
