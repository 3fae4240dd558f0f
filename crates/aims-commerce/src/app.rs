//! Explicitly wired storefront state.

use crate::backend::{Backend, HttpBackend};
use crate::cart::{CartStore, CartTotals};
use crate::catalog::{Product, ProductDetail, ProductKind};
use crate::checkout::Checkout;
use crate::config::StorefrontConfig;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::logging;
use aims_cache::Cache;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Everything one shopper's storefront needs, built once and passed around.
#[derive(Debug, Clone)]
pub struct Storefront {
    config: StorefrontConfig,
    backend: Arc<dyn Backend>,
    cart: CartStore,
    checkout: Checkout,
}

impl Storefront {
    /// Install logging, open storage and connect to the backend as configured.
    ///
    /// An already installed subscriber is left in place.
    pub fn from_config(config: StorefrontConfig) -> Result<Self> {
        if !logging::init(config.logging.format) {
            tracing::debug!("tracing subscriber already installed");
        }
        let cache = match &config.storage.dir {
            Some(dir) => Cache::open(dir)
                .with_context(|| format!("Failed to open storage at {}", dir.display()))?,
            None => Cache::in_memory(),
        };
        let backend = HttpBackend::connect(config.api.base_url.clone(), config.api.timeout())
            .with_context(|| format!("Invalid API base URL: {}", config.api.base_url))?;

        tracing::info!(
            api = %config.api.base_url,
            persistent = config.storage.dir.is_some(),
            "storefront ready"
        );
        Ok(Self::with_backend(config, cache, Arc::new(backend)))
    }

    /// Wire the storefront over an existing cache and backend.
    pub fn with_backend(config: StorefrontConfig, cache: Cache, backend: Arc<dyn Backend>) -> Self {
        let cart = CartStore::open(cache.clone(), config.cart.latency());
        let checkout = Checkout::new(
            backend.clone(),
            cart.clone(),
            cache,
            config.pricing.shipping_policy(),
            config.payment.clone(),
        );
        Self {
            config,
            backend,
            cart,
            checkout,
        }
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn checkout(&self) -> &Checkout {
        &self.checkout
    }

    /// Totals for the selected cart lines at the configured VAT rate.
    pub fn cart_totals(&self) -> Result<CartTotals, CommerceError> {
        CartTotals::for_selection(&self.cart.selected_lines(), self.config.pricing.vat_percent)
    }

    pub async fn products(&self) -> Result<Vec<Product>, CommerceError> {
        self.backend
            .products()
            .await
            .map_err(CommerceError::unavailable("list products"))
    }

    pub async fn product_detail(
        &self,
        product_id: ProductId,
        kind: ProductKind,
    ) -> Result<ProductDetail, CommerceError> {
        self.backend
            .product_detail(product_id, kind)
            .await
            .map_err(CommerceError::unavailable("product detail"))
    }
}
