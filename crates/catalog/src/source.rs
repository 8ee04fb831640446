//! Remote product source.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::dto::{ProductListing, SuggestedProductList};
use crate::error::CatalogError;

const PRODUCTS_PATH: &str = "products";
const SUGGESTED_PATH: &str = "suggestedProducts";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Where product lists come from.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// `GET {base}/products`.
    async fn products(&self) -> Result<Vec<ProductListing>, CatalogError>;

    /// `GET {base}/suggestedProducts`.
    async fn suggested_products(&self) -> Result<Vec<SuggestedProductList>, CatalogError>;
}

/// [`ProductSource`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProductSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProductSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "fetching product list");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(CatalogError::Api(status, resp.text().await.unwrap_or_default()));
        }

        resp.json().await.map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ProductSource for HttpProductSource {
    async fn products(&self) -> Result<Vec<ProductListing>, CatalogError> {
        self.get_json(PRODUCTS_PATH).await
    }

    async fn suggested_products(&self) -> Result<Vec<SuggestedProductList>, CatalogError> {
        self.get_json(SUGGESTED_PATH).await
    }
}
