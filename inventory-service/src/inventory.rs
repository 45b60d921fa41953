use std::sync::Arc;
use shared::{InventoryRecord, ProductId, PurchaseHistoryEntry};
use tracing::info;
use crate::error::{ServiceError, ServiceResult};
use crate::history::PurchaseHistoryLog;
use crate::product_client::ProductValidator;
use crate::store::InventoryStore;

/// Direct reads and administrative writes of stock levels. Nothing here is
/// recorded in the purchase history.
pub struct InventoryQueryService {
    products: ProductValidator,
    store: Arc<dyn InventoryStore>,
    history: Arc<dyn PurchaseHistoryLog>,
}

impl InventoryQueryService {
    pub fn new(
        products: ProductValidator,
        store: Arc<dyn InventoryStore>,
        history: Arc<dyn PurchaseHistoryLog>,
    ) -> Self {
        Self { products, store, history }
    }

    /// Unlike a purchase, a product without a record reads as zero stock.
    pub async fn get_inventory(&self, product_id: ProductId) -> ServiceResult<InventoryRecord> {
        self.products.validate(product_id).await?;
        Ok(self.store.get_or_create(product_id).await?)
    }

    pub async fn update_quantity(&self, product_id: ProductId, quantity: i64) -> ServiceResult<InventoryRecord> {
        if quantity < 0 {
            return Err(ServiceError::InvalidRequest(format!(
                "La cantidad no puede ser negativa, recibido {}",
                quantity
            )));
        }

        self.products.validate(product_id).await?;
        let record = self.store.update(product_id, quantity).await?;
        info!("Stock of product {} set to {}", product_id, record.quantity);
        Ok(record)
    }

    pub async fn purchase_history(&self, product_id: ProductId) -> ServiceResult<Vec<PurchaseHistoryEntry>> {
        Ok(self.history.for_product(product_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryInventoryStore, MemoryPurchaseHistoryLog};
    use crate::product_client::CatalogFailureMode;
    use crate::testing::StaticCatalog;
    use shared::NewPurchaseHistoryEntry;
    use shared::PurchaseRequest;

    struct Fixture {
        service: InventoryQueryService,
        store: Arc<MemoryInventoryStore>,
        history: Arc<MemoryPurchaseHistoryLog>,
        catalog: Arc<StaticCatalog>,
    }

    fn fixture(known: &[i64], mode: CatalogFailureMode) -> Fixture {
        let catalog = Arc::new(StaticCatalog::new(known));
        let store = Arc::new(MemoryInventoryStore::new());
        let history = Arc::new(MemoryPurchaseHistoryLog::new());
        let service = InventoryQueryService::new(
            ProductValidator::new(catalog.clone(), mode),
            store.clone(),
            history.clone(),
        );
        Fixture { service, store, history, catalog }
    }

    #[tokio::test]
    async fn returns_existing_inventory() {
        let f = fixture(&[1], CatalogFailureMode::Collapse);
        f.store.update(1, 5).await.unwrap();

        let record = f.service.get_inventory(1).await.unwrap();

        assert_eq!(record, InventoryRecord { product_id: 1, quantity: 5 });
    }

    #[tokio::test]
    async fn creates_empty_record_once() {
        let f = fixture(&[99], CatalogFailureMode::Collapse);

        let first = f.service.get_inventory(99).await.unwrap();
        let second = f.service.get_inventory(99).await.unwrap();

        assert_eq!(first, InventoryRecord { product_id: 99, quantity: 0 });
        assert_eq!(first, second);
        assert_eq!(f.store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found_and_not_created() {
        let f = fixture(&[], CatalogFailureMode::Collapse);

        let err = f.service.get_inventory(3).await.unwrap_err();

        assert_eq!(err.to_string(), "El producto con ID 3 no existe");
        assert!(f.store.is_empty());
        assert_eq!(f.history.len().await, 0);
    }

    #[tokio::test]
    async fn strict_mode_reports_unavailable_catalog() {
        let f = fixture(&[1], CatalogFailureMode::Strict);
        f.catalog.set_unavailable(true);

        let err = f.service.get_inventory(1).await.unwrap_err();

        assert!(matches!(err, ServiceError::Unavailable(_)));
    }

    #[tokio::test]
    async fn update_overwrites_existing_quantity() {
        let f = fixture(&[10], CatalogFailureMode::Collapse);
        f.store.update(10, 3).await.unwrap();

        let record = f.service.update_quantity(10, 8).await.unwrap();

        assert_eq!(record.quantity, 8);
        assert_eq!(f.store.find(10).await.unwrap().unwrap().quantity, 8);
    }

    #[tokio::test]
    async fn update_creates_missing_record_and_is_idempotent() {
        let f = fixture(&[20], CatalogFailureMode::Collapse);

        let first = f.service.update_quantity(20, 10).await.unwrap();
        let second = f.service.update_quantity(20, 10).await.unwrap();

        assert_eq!(first, InventoryRecord { product_id: 20, quantity: 10 });
        assert_eq!(first, second);
        assert_eq!(f.history.len().await, 0);
    }

    #[tokio::test]
    async fn update_of_unknown_product_writes_nothing() {
        let f = fixture(&[], CatalogFailureMode::Collapse);

        let err = f.service.update_quantity(30, 5).await.unwrap_err();

        assert!(err.to_string().contains("El producto con ID 30 no existe"));
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn negative_quantity_is_rejected() {
        let f = fixture(&[1], CatalogFailureMode::Collapse);

        let err = f.service.update_quantity(1, -1).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidRequest(_)));
        assert_eq!(f.catalog.calls(), 0);
    }

    #[tokio::test]
    async fn lists_history_of_one_product() {
        let f = fixture(&[1], CatalogFailureMode::Collapse);
        let request = PurchaseRequest { product_id: 1, quantity: 2 };
        f.history.append(NewPurchaseHistoryEntry::success(&request, "ok")).await.unwrap();

        let entries = f.service.purchase_history(1).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert!(f.service.purchase_history(2).await.unwrap().is_empty());
    }
}
