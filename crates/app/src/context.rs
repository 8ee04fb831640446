//! Application wiring.

use std::sync::Arc;

use shopcart_cart::{CartStateManager, Checkout, StoreError};
use shopcart_catalog::{CatalogError, HttpProductSource, ProductSource};
use shopcart_infra::SqliteCartStore;
use thiserror::Error;

use crate::config::{AppConfig, ConfigError, DbLocation};

/// The one cart manager of the process, shared by every screen.
pub type SharedCart = Arc<CartStateManager<SqliteCartStore>>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cart store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("product source unavailable: {0}")]
    Catalog(#[from] CatalogError),
}

/// Services built once at startup.
pub struct AppContext {
    pub cart: SharedCart,
    pub products: Arc<dyn ProductSource>,
    pub checkout: Checkout,
}

impl core::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppContext")
            .field("cart", &self.cart)
            .field("checkout", &self.checkout)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn build(config: &AppConfig) -> Result<Self, AppError> {
        let store = match &config.db {
            DbLocation::File(path) => SqliteCartStore::open(path)?,
            DbLocation::InMemory => {
                tracing::warn!("using an in-memory cart; nothing will be persisted");
                SqliteCartStore::in_memory()?
            }
        };
        let products = HttpProductSource::new(config.api_url.clone())?;

        tracing::info!(
            store = store.location(),
            api_url = %config.api_url,
            checkout_delay_ms = config.checkout_delay.as_millis() as u64,
            "application context built"
        );

        Ok(Self {
            cart: Arc::new(CartStateManager::new(store)),
            products: Arc::new(products),
            checkout: Checkout::new(config.checkout_delay),
        })
    }
}
