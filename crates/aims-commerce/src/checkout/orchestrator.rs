//! Drives a checkout attempt from cart selection to the payment gateway.

use crate::backend::Backend;
use crate::cart::CartStore;
use crate::checkout::{
    CancellationResult, CheckoutSession, CheckoutStep, DeliveryDraft, DeliveryDraftStore,
    OrderConfirmation, OrderDraft, OrderDraftStore, ShippingBreakdown, ShippingCalculator,
    ShippingPolicy,
};
use crate::config::PaymentSettings;
use crate::error::{CommerceError, ErrorKind};
use crate::ids::OrderId;
use crate::money::Money;
use aims_cache::Cache;
use std::sync::Arc;

/// Where to send the shopper once the order is placed.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRedirect {
    pub payment_url: String,
    pub amount: Money,
    pub order: OrderDraft,
    pub delivery: DeliveryDraft,
}

/// Checkout service.
///
/// Owns the draft stores and the shipping calculator; shares the cart with
/// the rest of the storefront.
#[derive(Debug, Clone)]
pub struct Checkout {
    backend: Arc<dyn Backend>,
    cart: CartStore,
    orders: OrderDraftStore,
    deliveries: DeliveryDraftStore,
    calculator: ShippingCalculator,
    payment: PaymentSettings,
}

impl Checkout {
    pub fn new(
        backend: Arc<dyn Backend>,
        cart: CartStore,
        cache: Cache,
        policy: ShippingPolicy,
        payment: PaymentSettings,
    ) -> Self {
        let orders = OrderDraftStore::orders(cache.clone());
        let deliveries = DeliveryDraftStore::deliveries(cache);
        let calculator = ShippingCalculator::new(backend.clone(), orders.clone(), policy);
        Self {
            backend,
            cart,
            orders,
            deliveries,
            calculator,
            payment,
        }
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Persisted order draft.
    pub fn orders(&self) -> &OrderDraftStore {
        &self.orders
    }

    /// Persisted delivery draft.
    pub fn deliveries(&self) -> &DeliveryDraftStore {
        &self.deliveries
    }

    pub fn calculator(&self) -> &ShippingCalculator {
        &self.calculator
    }

    /// Start checkout with the selected cart lines.
    ///
    /// The backend prices the selection; its draft is persisted before the
    /// session is returned.
    pub async fn begin(&self) -> Result<CheckoutSession, CommerceError> {
        let selected = self.cart.selected_lines();
        if selected.is_empty() {
            return Err(CommerceError::EmptySelection);
        }

        let mut draft = self
            .backend
            .place_order(&selected)
            .await
            .map_err(CommerceError::backend("place order"))?;
        draft.check_selection(&selected)?;
        draft.clear_rush();
        self.orders.save(&draft)?;

        tracing::info!(
            lines = selected.len(),
            total = draft.total_after_vat.amount,
            "checkout started"
        );
        Ok(CheckoutSession::new(selected, &draft))
    }

    /// Re-price shipping for the session's destination and rush flags.
    ///
    /// A failed backend call is logged and the previous breakdown stays.
    pub async fn reprice(
        &self,
        session: &mut CheckoutSession,
    ) -> Result<ShippingBreakdown, CommerceError> {
        if session.step().is_committed() {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: session.step(),
                to: CheckoutStep::ShippingPriced,
            });
        }

        let province = session.delivery().province.clone();
        match self
            .calculator
            .compute(&province, session.cart_lines(), session.lines())
            .await
        {
            Ok(breakdown) => {
                session.set_shipping(breakdown);
                if !province.trim().is_empty() {
                    session.advance(CheckoutStep::ShippingPriced)?;
                }
            }
            Err(error) if error.kind() == ErrorKind::Transient => {
                tracing::warn!(%error, province = %province, "keeping previous shipping breakdown");
            }
            Err(error) => return Err(error),
        }
        Ok(*session.shipping())
    }

    /// Submit delivery, save the final order draft and open a payment.
    ///
    /// Both drafts are persisted only once the backend has stored the
    /// delivery and handed out a payment URL. Any failure before that leaves
    /// the session and the persisted drafts as they were.
    pub async fn place_order(
        &self,
        session: &mut CheckoutSession,
    ) -> Result<PaymentRedirect, CommerceError> {
        let province = session.validate()?;
        session.step().transition(CheckoutStep::DeliveryConfirmed)?;

        let mut order = self
            .orders
            .load()
            .ok_or(CommerceError::MissingDraft("order"))?;

        let shipping = *session.shipping();
        let delivery = DeliveryDraft::new(session.delivery().clone(), shipping.total_shipping);
        let delivery = self
            .backend
            .submit_delivery(&delivery)
            .await
            .map_err(CommerceError::backend("submit delivery"))?;
        tracing::info!(
            delivery_id = %delivery.delivery_id,
            province = %province,
            fee = shipping.total_shipping.amount,
            "delivery confirmed"
        );

        order.reconcile_rush(session.lines());
        order.delivery_id = delivery.delivery_id;
        order.payment_method = session.payment_method();
        let order = order.with_totals(session.final_totals()?);

        let amount = order.total_after_vat;
        let payment_url = self
            .backend
            .initiate_payment(&self.payment.request(amount))
            .await
            .map_err(CommerceError::backend("initiate payment"))?;

        self.deliveries.save(&delivery)?;
        self.orders.save(&order)?;
        session.advance(CheckoutStep::DeliveryConfirmed)?;
        session.advance(CheckoutStep::OrderDraftSaved)?;
        session.advance(CheckoutStep::PaymentRedirected)?;

        tracing::info!(amount = amount.amount, "redirecting to payment");
        Ok(PaymentRedirect {
            payment_url,
            amount,
            order,
            delivery,
        })
    }

    /// The confirmation for `order_id`. Create one per page mount.
    pub fn confirmation(&self, order_id: OrderId) -> OrderConfirmation {
        OrderConfirmation::new(
            order_id,
            self.backend.clone(),
            self.cart.clone(),
            self.orders.clone(),
            self.deliveries.clone(),
        )
    }

    /// Ask the backend to cancel and refund `order_id`.
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<CancellationResult, CommerceError> {
        let response = self
            .backend
            .cancel_order(order_id)
            .await
            .map_err(CommerceError::backend("cancel order"))?;
        let result = CancellationResult::from_response(order_id, response);
        if result.success {
            tracing::info!(order_id = %order_id, refund = ?result.refund, "order cancelled");
        } else {
            tracing::warn!(
                order_id = %order_id,
                code = ?result.response_code,
                "cancellation rejected"
            );
        }
        Ok(result)
    }
}
