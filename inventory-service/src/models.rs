use diesel::prelude::*;
use chrono::{DateTime, Utc};
use shared::{InventoryRecord, NewPurchaseHistoryEntry, PurchaseHistoryEntry, PurchaseStatus};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::inventory)]
pub struct Inventory {
    pub product_id: i64,
    pub quantity: i64,
}

impl From<Inventory> for InventoryRecord {
    fn from(row: Inventory) -> Self {
        InventoryRecord {
            product_id: row.product_id,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::purchase_history)]
pub struct PurchaseHistory {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub date: DateTime<Utc>,
    pub status: String,
    pub message: String,
}

impl TryFrom<PurchaseHistory> for PurchaseHistoryEntry {
    type Error = anyhow::Error;

    fn try_from(row: PurchaseHistory) -> Result<Self, Self::Error> {
        let status = PurchaseStatus::parse(&row.status)
            .ok_or_else(|| anyhow::anyhow!("Unknown purchase status: {}", row.status))?;
        Ok(PurchaseHistoryEntry {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            date: row.date,
            status,
            message: row.message,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::purchase_history)]
pub struct NewPurchaseHistory {
    pub product_id: i64,
    pub quantity: i64,
    pub date: DateTime<Utc>,
    pub status: String,
    pub message: String,
}

impl From<&NewPurchaseHistoryEntry> for NewPurchaseHistory {
    fn from(entry: &NewPurchaseHistoryEntry) -> Self {
        NewPurchaseHistory {
            product_id: entry.product_id,
            quantity: entry.quantity,
            date: entry.date,
            status: entry.status.as_str().to_string(),
            message: entry.message.clone(),
        }
    }
}
