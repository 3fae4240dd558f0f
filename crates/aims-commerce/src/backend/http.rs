//! [`Backend`] over HTTP.

use super::wire::{
    DeliveryInfoResponse, FinishOrderRequest, PaymentResponse, PlaceOrderRequest,
    PlaceOrderResponse, RecalculateRequest,
};
use super::{Backend, CancelResponse, PaymentRequest, ShippingQuote};
use crate::cart::CartLine;
use crate::catalog::{Product, ProductDetail, ProductKind};
use crate::checkout::{DeliveryDraft, OrderDraft, Province};
use crate::ids::{OrderId, ProductId};
use aims_data::{FetchClient, FetchError};
use async_trait::async_trait;
use std::time::Duration;

/// The storefront backend reached through a [`FetchClient`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: FetchClient,
}

impl HttpBackend {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// Connect to `base_url` with a `reqwest` transport.
    pub fn connect(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self::new(FetchClient::reqwest(base_url, timeout)?))
    }

    pub fn client(&self) -> &FetchClient {
        &self.client
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn products(&self) -> Result<Vec<Product>, FetchError> {
        self.client.get("/product/all").send_json().await
    }

    async fn product_detail(
        &self,
        product_id: ProductId,
        kind: ProductKind,
    ) -> Result<ProductDetail, FetchError> {
        let value: serde_json::Value = self
            .client
            .get(format!("/product/all-detail/{}", product_id))
            .query("type", kind.as_str())
            .send_json()
            .await?;
        ProductDetail::from_json(value).map_err(|e| FetchError::ParseError(e.to_string()))
    }

    async fn recalculate(
        &self,
        province: Province,
        order: &OrderDraft,
    ) -> Result<ShippingQuote, FetchError> {
        let body = RecalculateRequest {
            province: province.name(),
            order,
        };
        self.client
            .post("/recalculate")
            .json(&body)?
            .send_json()
            .await
    }

    async fn submit_delivery(&self, delivery: &DeliveryDraft) -> Result<DeliveryDraft, FetchError> {
        let response: DeliveryInfoResponse = self
            .client
            .post("/deliveryinfo")
            .json(delivery)?
            .send_json()
            .await?;
        Ok(response.delivery_information)
    }

    async fn place_order(&self, lines: &[CartLine]) -> Result<OrderDraft, FetchError> {
        let response: PlaceOrderResponse = self
            .client
            .post("/placeorder")
            .json(&PlaceOrderRequest::new(lines))?
            .send_json()
            .await?;
        Ok(response.order)
    }

    async fn finish_order(
        &self,
        order: &OrderDraft,
        delivery: &DeliveryDraft,
    ) -> Result<serde_json::Value, FetchError> {
        let body = FinishOrderRequest {
            order,
            delivery_information: delivery,
        };
        self.client
            .post("/finish-order")
            .json(&body)?
            .send_json()
            .await
    }

    async fn initiate_payment(&self, request: &PaymentRequest) -> Result<String, FetchError> {
        let response: PaymentResponse = self
            .client
            .post("/api/payment")
            .json(request)?
            .send_json()
            .await?;
        Ok(response.payment_url)
    }

    async fn cancel_order(&self, order_id: OrderId) -> Result<CancelResponse, FetchError> {
        self.client
            .post("/api/order/cancel")
            .query("order_id", order_id)
            .json(&serde_json::json!({}))?
            .send_json()
            .await
    }
}
