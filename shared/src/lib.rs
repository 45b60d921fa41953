use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ProductId = i64;

/// Stock level of a single product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub product_id: ProductId,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Body of `PUT /api/inventory/{productId}`. Any `productId` in the body is
/// ignored in favour of the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    Success,
    Failed,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Success => "SUCCESS",
            PurchaseStatus::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SUCCESS" => Some(PurchaseStatus::Success),
            "FAILED" => Some(PurchaseStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record of one purchase attempt. Never mutated once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseHistoryEntry {
    pub id: i64,
    pub product_id: ProductId,
    pub quantity: i64,
    pub date: DateTime<Utc>,
    pub status: PurchaseStatus,
    pub message: String,
}

/// A history entry before the log assigns it an id.
#[derive(Debug, Clone)]
pub struct NewPurchaseHistoryEntry {
    pub product_id: ProductId,
    pub quantity: i64,
    pub date: DateTime<Utc>,
    pub status: PurchaseStatus,
    pub message: String,
}

impl NewPurchaseHistoryEntry {
    pub fn success(request: &PurchaseRequest, message: impl Into<String>) -> Self {
        Self::new(request, PurchaseStatus::Success, message)
    }

    pub fn failed(request: &PurchaseRequest, message: impl Into<String>) -> Self {
        Self::new(request, PurchaseStatus::Failed, message)
    }

    fn new(request: &PurchaseRequest, status: PurchaseStatus, message: impl Into<String>) -> Self {
        Self {
            product_id: request.product_id,
            quantity: request.quantity,
            date: Utc::now(),
            status,
            message: message.into(),
        }
    }

    pub fn with_id(self, id: i64) -> PurchaseHistoryEntry {
        PurchaseHistoryEntry {
            id,
            product_id: self.product_id,
            quantity: self.quantity,
            date: self.date,
            status: self.status,
            message: self.message,
        }
    }
}

/// Product as returned by the catalog. Only its existence matters here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductInfo(pub serde_json::Value);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
