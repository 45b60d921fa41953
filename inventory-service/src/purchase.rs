use std::sync::Arc;
use shared::{InventoryRecord, NewPurchaseHistoryEntry, PurchaseRequest};
use tracing::{debug, error, info, warn};
use crate::error::{ServiceError, ServiceResult};
use crate::history::PurchaseHistoryLog;
use crate::locks::ProductLocks;
use crate::product_client::ProductValidator;
use crate::store::{Decrement, InventoryStore};

pub const PURCHASE_COMPLETED: &str = "Compra realizada correctamente";
pub const PRODUCT_MISSING: &str = "Producto no existe";
pub const NO_STOCK: &str = "No stock para el producto";
pub const STOCK_TOO_LOW: &str = "Stock insuficiente";
pub const INVALID_QUANTITY: &str = "Cantidad inválida";
pub const UNEXPECTED_FAILURE: &str = "Error inesperado";

/// Why an attempt ended without a stock change.
#[derive(Debug)]
enum Rejection {
    InvalidQuantity(ServiceError),
    Product(ServiceError),
    NoStock(ServiceError),
    InsufficientStock(ServiceError),
    Unexpected(anyhow::Error),
    /// The success entry could not be written and the decrement was undone.
    Unrecorded(anyhow::Error),
}

impl Rejection {
    fn history_message(&self) -> &'static str {
        match self {
            Rejection::InvalidQuantity(_) => INVALID_QUANTITY,
            Rejection::Product(_) => PRODUCT_MISSING,
            Rejection::NoStock(_) => NO_STOCK,
            Rejection::InsufficientStock(_) => STOCK_TOO_LOW,
            Rejection::Unexpected(_) | Rejection::Unrecorded(_) => UNEXPECTED_FAILURE,
        }
    }

    fn into_error(self) -> ServiceError {
        match self {
            Rejection::InvalidQuantity(e)
            | Rejection::Product(e)
            | Rejection::NoStock(e)
            | Rejection::InsufficientStock(e) => e,
            Rejection::Unexpected(e) | Rejection::Unrecorded(e) => ServiceError::Unexpected(e),
        }
    }
}

/// Runs purchases: validate product, check and decrement stock, record the
/// attempt. Every call appends exactly one history entry, and a decrement
/// never outlives a failed write of its entry.
pub struct PurchaseCoordinator {
    products: ProductValidator,
    store: Arc<dyn InventoryStore>,
    history: Arc<dyn PurchaseHistoryLog>,
    locks: ProductLocks,
}

impl PurchaseCoordinator {
    pub fn new(
        products: ProductValidator,
        store: Arc<dyn InventoryStore>,
        history: Arc<dyn PurchaseHistoryLog>,
    ) -> Self {
        Self {
            products,
            store,
            history,
            locks: ProductLocks::new(),
        }
    }

    pub async fn purchase(&self, request: PurchaseRequest) -> ServiceResult<InventoryRecord> {
        let rejection = match self.execute(&request).await {
            Ok(record) => {
                info!(
                    "Purchased {} of product {}, {} left",
                    request.quantity, record.product_id, record.quantity
                );
                return Ok(record);
            }
            Err(Rejection::Unrecorded(e)) => return Err(ServiceError::Unexpected(e)),
            Err(rejection) => rejection,
        };

        let entry = NewPurchaseHistoryEntry::failed(&request, rejection.history_message());
        if let Err(e) = self.record(entry).await {
            error!(
                "Failed to record rejected purchase of product {} (quantity {}): {:#}",
                request.product_id, request.quantity, e
            );
            return Err(ServiceError::Unexpected(e));
        }

        warn!(
            "Purchase of {} of product {} rejected: {}",
            request.quantity,
            request.product_id,
            rejection.history_message()
        );
        Err(rejection.into_error())
    }

    async fn record(&self, entry: NewPurchaseHistoryEntry) -> anyhow::Result<i64> {
        let id = self
            .history
            .append(entry)
            .await
            .map_err(|e| e.context("Failed to record purchase history"))?;
        debug!("Recorded purchase history entry {}", id);
        Ok(id)
    }

    async fn execute(&self, request: &PurchaseRequest) -> Result<InventoryRecord, Rejection> {
        if request.quantity <= 0 {
            return Err(Rejection::InvalidQuantity(ServiceError::InvalidRequest(format!(
                "La cantidad debe ser mayor que cero, recibido {}",
                request.quantity
            ))));
        }

        // The catalog may take seconds to answer; no lock is held here.
        debug!("Validating product {}", request.product_id);
        self.products
            .validate(request.product_id)
            .await
            .map_err(Rejection::Product)?;

        debug!("Checking stock of product {}", request.product_id);
        let _guard = self.locks.acquire(request.product_id).await;

        let record = match self.store.decrement(request.product_id, request.quantity).await {
            Ok(Decrement::Applied(record)) => record,
            Ok(Decrement::Missing) => {
                return Err(Rejection::NoStock(ServiceError::no_stock(request.product_id)))
            }
            Ok(Decrement::Insufficient { available }) => {
                debug!(
                    "Product {} has {} in stock, {} requested",
                    request.product_id, available, request.quantity
                );
                return Err(Rejection::InsufficientStock(ServiceError::insufficient_stock(
                    request.product_id,
                )));
            }
            Err(e) => return Err(Rejection::Unexpected(e)),
        };

        // Still under the product lock, so nobody can observe the decrement
        // before its entry is written or the stock is put back.
        let entry = NewPurchaseHistoryEntry::success(request, PURCHASE_COMPLETED);
        if let Err(e) = self.record(entry).await {
            error!(
                "Failed to record purchase of product {} (quantity {}), restoring stock: {:#}",
                request.product_id, request.quantity, e
            );
            if let Err(restore) = self.store.restock(request.product_id, request.quantity).await {
                error!(
                    "Could not restore {} of product {}: {:#}",
                    request.quantity, request.product_id, restore
                );
                return Err(Rejection::Unrecorded(e.context(format!(
                    "stock of product {} left decremented by {}",
                    request.product_id, request.quantity
                ))));
            }
            return Err(Rejection::Unrecorded(e));
        }

        Ok(record)
    }
}
