//! Checkout flow state machine.

use crate::cart::{CartLine, CartTotals};
use crate::checkout::{
    DeliveryInformation, OrderDraft, OrderLineDraft, PaymentMethod, Province, ShippingBreakdown,
};
use crate::error::CommerceError;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Lines selected, order draft persisted.
    CartSelected,
    /// Delivery form filled in.
    DeliverySubmitted,
    /// Shipping priced for the current destination and rush flags.
    ShippingPriced,
    /// Backend stored the delivery record.
    DeliveryConfirmed,
    /// Order draft re-persisted with shipping included.
    OrderDraftSaved,
    /// Shopper sent to the payment gateway.
    PaymentRedirected,
    /// Backend finished the order.
    OrderFinalized,
}

impl CheckoutStep {
    /// Stable identifier used in logs and serialized state.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::CartSelected => "cart_selected",
            CheckoutStep::DeliverySubmitted => "delivery_submitted",
            CheckoutStep::ShippingPriced => "shipping_priced",
            CheckoutStep::DeliveryConfirmed => "delivery_confirmed",
            CheckoutStep::OrderDraftSaved => "order_draft_saved",
            CheckoutStep::PaymentRedirected => "payment_redirected",
            CheckoutStep::OrderFinalized => "order_finalized",
        }
    }

    /// Human-readable step name.
    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStep::CartSelected => "Cart",
            CheckoutStep::DeliverySubmitted => "Delivery",
            CheckoutStep::ShippingPriced => "Shipping",
            CheckoutStep::DeliveryConfirmed => "Delivery confirmed",
            CheckoutStep::OrderDraftSaved => "Review",
            CheckoutStep::PaymentRedirected => "Payment",
            CheckoutStep::OrderFinalized => "Complete",
        }
    }

    /// Get the step number (1-indexed).
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::CartSelected => 1,
            CheckoutStep::DeliverySubmitted => 2,
            CheckoutStep::ShippingPriced => 3,
            CheckoutStep::DeliveryConfirmed => 4,
            CheckoutStep::OrderDraftSaved => 5,
            CheckoutStep::PaymentRedirected => 6,
            CheckoutStep::OrderFinalized => 7,
        }
    }

    /// Whether the flow may move from `self` to `next`.
    ///
    /// Steps advance one at a time. While the form is still editable the
    /// flow may fall back to `DeliverySubmitted` and be re-priced.
    pub fn can_transition_to(&self, next: CheckoutStep) -> bool {
        use CheckoutStep::*;
        match (*self, next) {
            (CartSelected | DeliverySubmitted | ShippingPriced, DeliverySubmitted) => true,
            (DeliverySubmitted | ShippingPriced, ShippingPriced) => true,
            (from, to) => to.number() == from.number() + 1,
        }
    }

    /// The step after `self`, checked against [`can_transition_to`](Self::can_transition_to).
    pub fn transition(self, next: CheckoutStep) -> Result<CheckoutStep, CommerceError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CommerceError::InvalidCheckoutTransition {
                from: self,
                to: next,
            })
        }
    }

    /// True once the form can no longer be edited.
    pub fn is_committed(&self) -> bool {
        self.number() >= CheckoutStep::DeliveryConfirmed.number()
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form state of one checkout attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    cart_lines: Vec<CartLine>,
    lines: Vec<OrderLineDraft>,
    delivery: DeliveryInformation,
    payment_method: PaymentMethod,
    totals: CartTotals,
    shipping: ShippingBreakdown,
    step: CheckoutStep,
}

impl CheckoutSession {
    /// A session over the selected `cart_lines`, priced by `draft`.
    pub fn new(cart_lines: Vec<CartLine>, draft: &OrderDraft) -> Self {
        Self {
            cart_lines,
            lines: draft.lines.clone(),
            delivery: DeliveryInformation::default(),
            payment_method: draft.payment_method,
            totals: draft.totals(),
            shipping: ShippingBreakdown::zero(),
            step: CheckoutStep::CartSelected,
        }
    }

    /// Current step.
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// The cart lines the checkout was started from.
    pub fn cart_lines(&self) -> &[CartLine] {
        &self.cart_lines
    }

    /// Order lines with their rush state.
    pub fn lines(&self) -> &[OrderLineDraft] {
        &self.lines
    }

    pub fn line(&self, product_id: ProductId) -> Option<&OrderLineDraft> {
        self.lines.iter().find(|l| l.product_id() == product_id)
    }

    /// Delivery form as last edited.
    pub fn delivery(&self) -> &DeliveryInformation {
        &self.delivery
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Totals before shipping.
    pub fn totals(&self) -> CartTotals {
        self.totals
    }

    /// Last shipping breakdown; zero until priced.
    pub fn shipping(&self) -> &ShippingBreakdown {
        &self.shipping
    }

    /// Totals with the current shipping total added.
    pub fn final_totals(&self) -> Result<CartTotals, CommerceError> {
        self.totals.with_shipping(self.shipping.total_shipping)
    }

    /// True if any line is flagged rush.
    pub fn has_rush_lines(&self) -> bool {
        self.lines.iter().any(OrderLineDraft::is_rush)
    }

    pub(crate) fn advance(&mut self, next: CheckoutStep) -> Result<(), CommerceError> {
        self.step = self.step.transition(next)?;
        tracing::debug!(step = %self.step, "checkout advanced");
        Ok(())
    }

    pub(crate) fn set_shipping(&mut self, shipping: ShippingBreakdown) {
        self.shipping = shipping;
    }

    /// Replace the delivery form contents.
    ///
    /// A new destination drops any shipping already priced.
    pub fn set_delivery(&mut self, delivery: DeliveryInformation) -> Result<(), CommerceError> {
        self.editable()?;
        let moved = delivery.province != self.delivery.province;
        self.delivery = delivery;
        if moved {
            self.shipping = ShippingBreakdown::zero();
        }
        if moved || self.step == CheckoutStep::CartSelected {
            self.advance(CheckoutStep::DeliverySubmitted)?;
        }
        Ok(())
    }

    /// Change only the destination; shipping must be priced again.
    pub fn set_province(&mut self, province: &str) -> Result<(), CommerceError> {
        let mut delivery = self.delivery.clone();
        delivery.province = province.trim().to_string();
        self.set_delivery(delivery)
    }

    /// Choose how to pay.
    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), CommerceError> {
        self.editable()?;
        self.payment_method = method;
        Ok(())
    }

    /// Flag a line for rush delivery, or unflag it.
    ///
    /// Only products that support rush delivery can be flagged. Unflagging
    /// clears the line's delivery time and instructions.
    pub fn set_rush(&mut self, product_id: ProductId, rush: bool) -> Result<(), CommerceError> {
        self.editable()?;
        let supported = self
            .cart_lines
            .iter()
            .find(|l| l.product_id() == product_id)
            .is_some_and(|l| l.product.rush_order_supported);
        if rush && !supported {
            return Err(CommerceError::RushNotSupported(product_id));
        }
        let line = self.line_mut(product_id)?;
        if line.is_rush() == rush {
            return Ok(());
        }
        line.set_rush(rush);
        self.reprice_needed();
        Ok(())
    }

    /// Book a rush slot for one line.
    pub fn set_delivery_time(&mut self, product_id: ProductId, slot: &str) -> Result<(), CommerceError> {
        self.editable()?;
        self.line_mut(product_id)?.set_delivery_time(slot)?;
        self.reprice_needed();
        Ok(())
    }

    /// Set or clear delivery instructions for one line.
    pub fn set_instructions(
        &mut self,
        product_id: ProductId,
        instructions: Option<String>,
    ) -> Result<(), CommerceError> {
        self.editable()?;
        self.line_mut(product_id)?.set_instructions(instructions);
        Ok(())
    }

    /// Check the form is complete enough to place the order.
    pub fn validate(&self) -> Result<Province, CommerceError> {
        self.lines.iter().try_for_each(OrderLineDraft::validate)?;
        self.delivery.validate()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Result<&mut OrderLineDraft, CommerceError> {
        self.lines
            .iter_mut()
            .find(|l| l.product_id() == product_id)
            .ok_or(CommerceError::ItemNotInCart(product_id))
    }

    fn editable(&self) -> Result<(), CommerceError> {
        if self.step.is_committed() {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: self.step,
                to: CheckoutStep::DeliverySubmitted,
            });
        }
        Ok(())
    }

    fn reprice_needed(&mut self) {
        if self.step == CheckoutStep::ShippingPriced {
            self.step = CheckoutStep::DeliverySubmitted;
        }
    }
}
