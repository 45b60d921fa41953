use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::{AsyncConnection, RunQueryDsl};
use shared::{InventoryRecord, ProductId};
use crate::models::Inventory;
use crate::schema::inventory;
use crate::DbPool;

/// Result of a checked stock decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decrement {
    Applied(InventoryRecord),
    /// Stock left untouched.
    Insufficient { available: i64 },
    /// No record has ever been created for the product.
    Missing,
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Returns the record without creating it.
    async fn find(&self, product_id: ProductId) -> Result<Option<InventoryRecord>>;

    /// Returns the record, creating it with quantity 0 if absent.
    async fn get_or_create(&self, product_id: ProductId) -> Result<InventoryRecord>;

    /// Overwrites the quantity, creating the record if absent.
    async fn update(&self, product_id: ProductId, quantity: i64) -> Result<InventoryRecord>;

    /// Subtracts `amount` only if enough stock is available.
    async fn decrement(&self, product_id: ProductId, amount: i64) -> Result<Decrement>;

    /// Adds `amount` back, undoing a decrement whose purchase could not be recorded.
    async fn restock(&self, product_id: ProductId, amount: i64) -> Result<InventoryRecord>;
}

pub struct PgInventoryStore {
    pool: DbPool,
}

impl PgInventoryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn find(&self, product_id: ProductId) -> Result<Option<InventoryRecord>> {
        let mut conn = self.pool.get().await?;

        let row = inventory::table
            .find(product_id)
            .select(Inventory::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(row.map(InventoryRecord::from))
    }

    async fn get_or_create(&self, product_id: ProductId) -> Result<InventoryRecord> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(inventory::table)
            .values(&Inventory { product_id, quantity: 0 })
            .on_conflict(inventory::product_id)
            .do_nothing()
            .execute(&mut conn)
            .await?;

        let row = inventory::table
            .find(product_id)
            .select(Inventory::as_select())
            .first(&mut conn)
            .await?;

        Ok(row.into())
    }

    async fn update(&self, product_id: ProductId, quantity: i64) -> Result<InventoryRecord> {
        let mut conn = self.pool.get().await?;

        let row = diesel::insert_into(inventory::table)
            .values(&Inventory { product_id, quantity })
            .on_conflict(inventory::product_id)
            .do_update()
            .set(inventory::quantity.eq(excluded(inventory::quantity)))
            .returning(Inventory::as_returning())
            .get_result(&mut conn)
            .await?;

        Ok(row.into())
    }

    async fn decrement(&self, product_id: ProductId, amount: i64) -> Result<Decrement> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, anyhow::Error, _>(|conn| {
            Box::pin(async move {
                let current = inventory::table
                    .find(product_id)
                    .select(Inventory::as_select())
                    .for_update()
                    .get_result(conn)
                    .await
                    .optional()?;

                let current = match current {
                    Some(row) => row,
                    None => return Ok(Decrement::Missing),
                };

                if current.quantity < amount {
                    return Ok(Decrement::Insufficient { available: current.quantity });
                }

                let row = diesel::update(inventory::table.find(product_id))
                    .set(inventory::quantity.eq(current.quantity - amount))
                    .returning(Inventory::as_returning())
                    .get_result(conn)
                    .await?;

                Ok(Decrement::Applied(row.into()))
            })
        })
        .await
    }

    async fn restock(&self, product_id: ProductId, amount: i64) -> Result<InventoryRecord> {
        let mut conn = self.pool.get().await?;

        let row = diesel::update(inventory::table.find(product_id))
            .set(inventory::quantity.eq(inventory::quantity + amount))
            .returning(Inventory::as_returning())
            .get_result(&mut conn)
            .await?;

        Ok(row.into())
    }
}
