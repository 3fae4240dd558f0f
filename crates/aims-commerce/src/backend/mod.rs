//! The order backend the checkout talks to.
//!
//! [`Backend`] is the seam between the checkout core and the network: the
//! storefront wires in [`HttpBackend`], tests wire in an in-process fake.

mod http;
pub mod wire;

pub use http::HttpBackend;
pub use wire::{CancelResponse, PaymentRequest, ShippingQuote};

use crate::cart::CartLine;
use crate::catalog::{Product, ProductDetail, ProductKind};
use crate::checkout::{DeliveryDraft, OrderDraft, Province};
use crate::ids::{OrderId, ProductId};
use aims_data::FetchError;
use async_trait::async_trait;
use std::fmt;

/// Operations the backend exposes to the storefront.
#[async_trait]
pub trait Backend: Send + Sync + fmt::Debug {
    /// `GET /product/all`
    async fn products(&self) -> Result<Vec<Product>, FetchError>;

    /// `GET /product/all-detail/{id}?type={kind}`
    async fn product_detail(
        &self,
        product_id: ProductId,
        kind: ProductKind,
    ) -> Result<ProductDetail, FetchError>;

    /// `POST /recalculate`
    async fn recalculate(
        &self,
        province: Province,
        order: &OrderDraft,
    ) -> Result<ShippingQuote, FetchError>;

    /// `POST /deliveryinfo`; returns the stored record with its id.
    async fn submit_delivery(&self, delivery: &DeliveryDraft) -> Result<DeliveryDraft, FetchError>;

    /// `POST /placeorder`; returns the backend-priced draft.
    async fn place_order(&self, lines: &[CartLine]) -> Result<OrderDraft, FetchError>;

    /// `POST /finish-order`. Not idempotent.
    async fn finish_order(
        &self,
        order: &OrderDraft,
        delivery: &DeliveryDraft,
    ) -> Result<serde_json::Value, FetchError>;

    /// `POST /api/payment`; returns the gateway URL to send the shopper to.
    async fn initiate_payment(&self, request: &PaymentRequest) -> Result<String, FetchError>;

    /// `POST /api/order/cancel?order_id={id}`
    async fn cancel_order(&self, order_id: OrderId) -> Result<CancelResponse, FetchError>;
}
