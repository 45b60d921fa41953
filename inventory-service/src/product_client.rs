use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use shared::{ProductId, ProductInfo};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use crate::error::{ServiceError, ServiceResult};

pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Outcome of asking the catalog about a product.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductLookup {
    Found(ProductInfo),
    /// The catalog answered 404. Never retried.
    NotFound,
    /// The catalog could not be reached or kept failing.
    Unavailable(String),
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn lookup(&self, product_id: ProductId) -> ProductLookup;
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Applies to each attempt separately.
    pub timeout: Duration,
    /// Attempts made after the first one fails.
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            max_retries: 2,
            delay: Duration::from_millis(500),
        }
    }
}

enum Attempt {
    Found(ProductInfo),
    NotFound,
    Retryable(String),
    Rejected(String),
}

/// HTTP client for the products service.
#[derive(Clone)]
pub struct ProductClient {
    client: Client,
    base_url: String,
    api_key: String,
    policy: RetryPolicy,
}

impl ProductClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, policy: RetryPolicy) -> Result<Self> {
        let client = Client::builder().timeout(policy.timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            policy,
        })
    }

    async fn attempt(&self, product_id: ProductId) -> Attempt {
        let url = format!("{}/api/products/{}", self.base_url, product_id);

        let response = match self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Attempt::Retryable(format!("timed out after {:?}", self.policy.timeout))
            }
            Err(e) => return Attempt::Retryable(format!("Failed to call products service: {}", e)),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Attempt::NotFound;
        }
        if status.is_server_error() {
            return Attempt::Retryable(format!("Products service returned {}", status));
        }
        if !status.is_success() {
            return Attempt::Rejected(format!("Products service returned {}", status));
        }

        match response.json::<serde_json::Value>().await {
            Ok(body) => Attempt::Found(ProductInfo(body)),
            Err(e) => Attempt::Retryable(format!("Invalid product response: {}", e)),
        }
    }
}

#[async_trait]
impl ProductCatalog for ProductClient {
    async fn lookup(&self, product_id: ProductId) -> ProductLookup {
        let attempts = self.policy.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.attempt(product_id).await {
                Attempt::Found(info) => {
                    debug!("Product {} found in catalog", product_id);
                    return ProductLookup::Found(info);
                }
                Attempt::NotFound => {
                    debug!("Product {} not found in catalog", product_id);
                    return ProductLookup::NotFound;
                }
                Attempt::Rejected(reason) => {
                    warn!("Catalog rejected lookup of product {}: {}", product_id, reason);
                    return ProductLookup::Unavailable(reason);
                }
                Attempt::Retryable(reason) => {
                    warn!(
                        "Lookup of product {} failed (attempt {}/{}): {}",
                        product_id, attempt, attempts, reason
                    );
                    last_error = reason;
                    if attempt < attempts {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }

        error!("Giving up on product {} after {} attempts", product_id, attempts);
        ProductLookup::Unavailable(last_error)
    }
}

/// How an unreachable catalog is reported to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogFailureMode {
    /// `Unavailable` is reported exactly like `NotFound`.
    #[default]
    Collapse,
    /// `Unavailable` surfaces as its own error.
    Strict,
}

/// Turns catalog lookups into service results.
#[derive(Clone)]
pub struct ProductValidator {
    catalog: Arc<dyn ProductCatalog>,
    mode: CatalogFailureMode,
}

impl ProductValidator {
    pub fn new(catalog: Arc<dyn ProductCatalog>, mode: CatalogFailureMode) -> Self {
        Self { catalog, mode }
    }

    pub async fn validate(&self, product_id: ProductId) -> ServiceResult<ProductInfo> {
        match self.catalog.lookup(product_id).await {
            ProductLookup::Found(info) => Ok(info),
            ProductLookup::NotFound => Err(ServiceError::product_not_found(product_id)),
            ProductLookup::Unavailable(reason) => match self.mode {
                CatalogFailureMode::Collapse => {
                    warn!(
                        "Catalog unavailable for product {}, reporting it as missing: {}",
                        product_id, reason
                    );
                    Err(ServiceError::product_not_found(product_id))
                }
                CatalogFailureMode::Strict => Err(ServiceError::catalog_unavailable(product_id, &reason)),
            },
        }
    }
}
