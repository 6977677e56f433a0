//! Product catalog API client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`; the catalog is the source of truth
//! - No caching, retries or request deduplication: every call is one request
//! - Wire types live in [`wire`] and are converted into
//!   [`quickkart_core::ProductRecord`] before leaving this module
//!
//! # Endpoints
//!
//! ```text
//! GET {base}/products       -> [Product]
//! GET {base}/products/{id}  -> Product (empty body or null when unknown)
//! ```

mod wire;

use std::sync::Arc;

use quickkart_core::{ProductId, ProductRecord};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::CatalogConfig;

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("Catalog returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog sent a product we cannot represent.
    #[error("Invalid product {id}: {reason}")]
    InvalidProduct { id: u32, reason: String },

    /// No product has this id.
    #[error("Product {0} not found")]
    NotFound(ProductId),
}

impl CatalogError {
    /// Message safe to show in the storefront.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "We couldn't find that product.",
            Self::Http(_) | Self::Status(_) => "We couldn't reach the product catalog.",
            Self::Parse(_) | Self::InvalidProduct { .. } => {
                "The product catalog sent something unexpected."
            }
        }
    }

    /// Whether asking again could give a different answer.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}

/// Client for the product catalog API.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    products_url: String,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (e.g. no TLS
    /// backend is available).
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("quickkart/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let products_url = format!(
            "{}/products",
            config.base_url.as_str().trim_end_matches('/')
        );

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                products_url,
            }),
        })
    }

    /// Fetch every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx, or the
    /// body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductRecord>, CatalogError> {
        let body = self.get(&self.inner.products_url).await?;
        let products: Vec<wire::Product> = serde_json::from_str(&body).inspect_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse product list"
            );
        })?;

        debug!(count = products.len(), "Fetched product list");
        products.into_iter().map(ProductRecord::try_from).collect()
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the catalog does not know `id`,
    /// or another error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<ProductRecord, CatalogError> {
        let url = format!("{}/{id}", self.inner.products_url);
        let body = match self.get(&url).await {
            Err(CatalogError::Status(status)) if status == reqwest::StatusCode::NOT_FOUND => {
                return Err(CatalogError::NotFound(id));
            }
            other => other?,
        };

        // The fake store API answers unknown ids with 200 and no product.
        if body.trim().is_empty() {
            return Err(CatalogError::NotFound(id));
        }
        let product: Option<wire::Product> = serde_json::from_str(&body)?;
        let product = product.ok_or(CatalogError::NotFound(id))?;

        ProductRecord::try_from(product)
    }

    /// GET `url` and return the body of a 2xx response.
    async fn get(&self, url: &str) -> Result<String, CatalogError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                url,
                body = %body.chars().take(200).collect::<String>(),
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Status(status));
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound(ProductId::new(42));
        assert_eq!(err.to_string(), "Product 42 not found");

        let err = CatalogError::Status(reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Catalog returned HTTP 502 Bad Gateway");
    }

    #[test]
    fn test_user_messages_hide_details() {
        let err = CatalogError::InvalidProduct {
            id: 3,
            reason: "price is NaN".to_string(),
        };
        assert!(!err.user_message().contains("NaN"));
        assert_eq!(
            CatalogError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR).user_message(),
            "We couldn't reach the product catalog."
        );
    }

    #[test]
    fn test_only_missing_products_are_final() {
        assert!(!CatalogError::NotFound(ProductId::new(7)).is_retryable());
        assert!(CatalogError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE).is_retryable());
        assert!(
            CatalogError::InvalidProduct {
                id: 7,
                reason: "negative price".to_string(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_products_url_strips_trailing_slash() {
        let config = CatalogConfig {
            base_url: url::Url::parse("http://127.0.0.1:8000/api/").expect("valid url"),
            timeout: std::time::Duration::from_secs(1),
        };
        let client = CatalogClient::new(&config).expect("client builds");
        assert_eq!(client.inner.products_url, "http://127.0.0.1:8000/api/products");
    }
}
