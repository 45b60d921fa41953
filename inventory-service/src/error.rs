use shared::ProductId;
use thiserror::Error;

/// Errors surfaced by the inventory and purchase services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Product unknown to the catalog.
    #[error("{0}")]
    NotFound(String),

    /// No stock record, or not enough stock for the requested quantity.
    #[error("{0}")]
    InsufficientStock(String),

    #[error("{0}")]
    InvalidRequest(String),

    /// Catalog could not be reached after retries.
    #[error("{0}")]
    Unavailable(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn product_not_found(product_id: ProductId) -> Self {
        ServiceError::NotFound(format!("El producto con ID {} no existe", product_id))
    }

    pub fn no_stock(product_id: ProductId) -> Self {
        ServiceError::InsufficientStock(format!("No stock for product {}", product_id))
    }

    pub fn insufficient_stock(product_id: ProductId) -> Self {
        ServiceError::InsufficientStock(format!("Insufficient stock for product {}", product_id))
    }

    pub fn catalog_unavailable(product_id: ProductId, reason: &str) -> Self {
        ServiceError::Unavailable(format!(
            "No se pudo validar el producto con ID {}: {}",
            product_id, reason
        ))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
