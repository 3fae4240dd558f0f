//! Post-payment order finalization.

use crate::backend::Backend;
use crate::cart::CartStore;
use crate::checkout::{
    CheckoutStep, DeliveryDraft, DeliveryDraftStore, Order, OrderDraftStore, SingleFlight,
};
use crate::error::CommerceError;
use crate::ids::OrderId;
use std::sync::Arc;

/// The persisted order and delivery, as shown on the confirmation page.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetails {
    pub order: Order,
    pub delivery: DeliveryDraft,
}

impl OrderDetails {
    /// True if the stored order has rush lines.
    pub fn has_rush_lines(&self) -> bool {
        self.order.submitted().has_rush_lines()
    }
}

/// A finished order.
#[derive(Debug, Clone)]
pub struct FinalizedOrder {
    pub order: Order,
    pub delivery: DeliveryDraft,
    /// Whatever the backend answered to `/finish-order`.
    pub receipt: serde_json::Value,
    /// `None` if the details read failed.
    pub details: Option<OrderDetails>,
}

impl FinalizedOrder {
    /// Always the finalized step.
    pub fn step(&self) -> CheckoutStep {
        CheckoutStep::OrderFinalized
    }
}

#[derive(Debug, Clone)]
pub enum FinalizeOutcome {
    Finalized(FinalizedOrder),
    /// Another call on this confirmation already went out.
    AlreadyInFlight,
}

/// The confirmation page for one order id.
///
/// Holds a [`SingleFlight`] latch: `/finish-order` goes out at most once per
/// confirmation, however often [`finalize`](Self::finalize) is called.
#[derive(Debug)]
pub struct OrderConfirmation {
    order_id: OrderId,
    backend: Arc<dyn Backend>,
    cart: CartStore,
    orders: OrderDraftStore,
    deliveries: DeliveryDraftStore,
    latch: SingleFlight,
}

impl OrderConfirmation {
    pub(crate) fn new(
        order_id: OrderId,
        backend: Arc<dyn Backend>,
        cart: CartStore,
        orders: OrderDraftStore,
        deliveries: DeliveryDraftStore,
    ) -> Self {
        Self {
            order_id,
            backend,
            cart,
            orders,
            deliveries,
            latch: SingleFlight::new(),
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Read the persisted drafts, stamped with this order id.
    pub async fn details(&self) -> Option<OrderDetails> {
        let order = self.orders.load()?;
        let delivery = self.deliveries.load()?;
        Some(OrderDetails {
            order: order.confirm(self.order_id),
            delivery,
        })
    }

    /// Finish the order with the backend.
    ///
    /// The details read runs alongside the `/finish-order` call. Once the
    /// backend accepts, the cart is emptied and both drafts are removed, even
    /// if the details read came back empty. If the backend fails, nothing
    /// local changes.
    pub async fn finalize(&self) -> Result<FinalizeOutcome, CommerceError> {
        if !self.latch.try_begin() {
            tracing::debug!(order_id = %self.order_id, "finalize already in flight");
            return Ok(FinalizeOutcome::AlreadyInFlight);
        }

        let draft = self.orders.load().ok_or(CommerceError::MissingDraft("order"))?;
        let delivery = self
            .deliveries
            .load()
            .ok_or(CommerceError::MissingDraft("delivery"))?;
        let order = draft.confirm(self.order_id);

        let (details, finished) = futures::join!(
            self.details(),
            self.backend.finish_order(order.submitted(), &delivery)
        );
        let receipt = finished.map_err(|source| {
            tracing::error!(order_id = %self.order_id, error = %source, "finish order failed");
            CommerceError::backend("finish order")(source)
        })?;
        if details.is_none() {
            tracing::warn!(order_id = %self.order_id, "order details unavailable");
        }

        if let Err(error) = self.cart.clear_cart().await {
            tracing::warn!(order_id = %self.order_id, %error, "failed to clear cart");
        }
        for (key, cleared) in [
            (self.orders.key(), self.orders.clear()),
            (self.deliveries.key(), self.deliveries.clear()),
        ] {
            if let Err(error) = cleared {
                tracing::warn!(key, %error, "failed to clear draft");
            }
        }

        tracing::info!(
            order_id = %self.order_id,
            total = order.total_after_vat().amount,
            "order finalized"
        );
        Ok(FinalizeOutcome::Finalized(FinalizedOrder {
            order,
            delivery,
            receipt,
            details,
        }))
    }
}
