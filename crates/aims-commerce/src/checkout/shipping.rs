//! Shipping fees.
//!
//! The backend prices shipping authoritatively through `/recalculate`.
//! [`ShippingPolicy`] is the local statement of the same tariff, used to
//! cross-check what the backend answers.

use crate::backend::{Backend, ShippingQuote};
use crate::cart::CartLine;
use crate::checkout::{OrderDraftStore, OrderLineDraft, Province};
use crate::error::CommerceError;
use crate::money::Money;
use crate::weight::Weight;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shipping fees for one checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ShippingBreakdown {
    pub regular_shipping: Money,
    pub rush_shipping: Money,
    pub free_shipping_discount: Money,
    /// `regular + rush - discount`, never negative.
    pub total_shipping: Money,
}

impl ShippingBreakdown {
    /// No destination chosen yet.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn new(regular: Money, rush: Money, discount: Money) -> Result<Self, CommerceError> {
        let total = regular
            .try_add(&rush)
            .and_then(|gross| gross.try_subtract(&discount))
            .ok_or(CommerceError::Overflow)?
            .floor_zero();
        Ok(Self {
            regular_shipping: regular,
            rush_shipping: rush,
            free_shipping_discount: discount,
            total_shipping: total,
        })
    }

    /// Take the backend's figures, deriving the discount it applied.
    ///
    /// A total above `regular + rush` is clamped to that sum.
    pub fn from_quote(quote: ShippingQuote) -> Self {
        let regular = quote.regular_shipping.floor_zero();
        let rush = quote.rush_shipping.floor_zero();
        let gross = Money::new(regular.amount.saturating_add(rush.amount), regular.currency);
        let mut total = quote.total_shipping.floor_zero();
        if total.amount > gross.amount {
            tracing::warn!(
                regular = regular.amount,
                rush = rush.amount,
                total = total.amount,
                "backend shipping total exceeds its parts"
            );
            total = gross;
        }
        Self {
            regular_shipping: regular,
            rush_shipping: rush,
            free_shipping_discount: Money::new(gross.amount - total.amount, gross.currency),
            total_shipping: total,
        }
    }

    pub fn has_rush(&self) -> bool {
        self.rush_shipping.is_positive()
    }
}

/// The shipping tariff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingPolicy {
    /// First-tier fee in Hà Nội and TP Hồ Chí Minh.
    pub metropolitan_base_fee: Money,
    pub metropolitan_tier: Weight,
    /// First-tier fee everywhere else.
    pub provincial_base_fee: Money,
    pub provincial_tier: Weight,
    /// Charged per started `increment_step` above the tier.
    pub increment_fee: Money,
    pub increment_step: Weight,
    /// Added to the base fee of every rush line.
    pub rush_surcharge: Money,
    /// Knocked off regular shipping for qualifying orders.
    pub free_shipping_discount: Money,
    /// Orders with a subtotal before VAT above this qualify.
    pub free_shipping_threshold: Money,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            metropolitan_base_fee: Money::vnd(22_000),
            metropolitan_tier: Weight::grams(3_000),
            provincial_base_fee: Money::vnd(30_000),
            provincial_tier: Weight::grams(500),
            increment_fee: Money::vnd(2_500),
            increment_step: Weight::grams(500),
            rush_surcharge: Money::vnd(10_000),
            free_shipping_discount: Money::vnd(25_000),
            free_shipping_threshold: Money::vnd(100_000),
        }
    }
}

impl ShippingPolicy {
    /// Weight-based fee for one parcel.
    ///
    /// ```
    /// use aims_commerce::checkout::{Province, ShippingPolicy};
    /// use aims_commerce::money::Money;
    /// use aims_commerce::weight::Weight;
    ///
    /// let policy = ShippingPolicy::default();
    /// let hanoi = Province::parse("Hà Nội").unwrap();
    /// assert_eq!(policy.base_fee(hanoi, Weight::grams(3000)).unwrap(), Money::vnd(22_000));
    /// assert_eq!(policy.base_fee(hanoi, Weight::grams(3010)).unwrap(), Money::vnd(24_500));
    /// ```
    pub fn base_fee(&self, province: Province, weight: Weight) -> Result<Money, CommerceError> {
        let (base, tier) = if province.is_metropolitan() {
            (self.metropolitan_base_fee, self.metropolitan_tier)
        } else {
            (self.provincial_base_fee, self.provincial_tier)
        };
        let increments = weight.increments_above(tier, self.increment_step);
        self.increment_fee
            .try_multiply(increments)
            .and_then(|extra| base.try_add(&extra))
            .ok_or(CommerceError::Overflow)
    }

    /// Price `cart_lines` for delivery to `province`.
    ///
    /// Each line is its own parcel weighing `unit weight × quantity`. A line
    /// whose draft is flagged rush with a booked slot is charged
    /// `base + rush surcharge` into rush shipping; everything else goes to
    /// regular shipping.
    pub fn quote(
        &self,
        province: Province,
        cart_lines: &[CartLine],
        drafts: &[OrderLineDraft],
        subtotal_before_vat: Money,
    ) -> Result<ShippingBreakdown, CommerceError> {
        let mut regular = Money::zero(self.increment_fee.currency);
        let mut rush = Money::zero(self.increment_fee.currency);

        for line in cart_lines {
            let fee = self.base_fee(province, line.product.weight.times(line.quantity))?;
            let is_rush = drafts
                .iter()
                .find(|d| d.product_id() == line.product_id())
                .is_some_and(OrderLineDraft::is_priced_as_rush);
            if is_rush {
                let fee = fee
                    .try_add(&self.rush_surcharge)
                    .ok_or(CommerceError::Overflow)?;
                rush = rush.try_add(&fee).ok_or(CommerceError::Overflow)?;
            } else {
                regular = regular.try_add(&fee).ok_or(CommerceError::Overflow)?;
            }
        }

        let discount = if subtotal_before_vat.amount > self.free_shipping_threshold.amount {
            self.free_shipping_discount.min(regular)
        } else {
            Money::zero(regular.currency)
        };
        ShippingBreakdown::new(regular, rush, discount)
    }
}

/// Prices shipping through the backend, keeping the persisted order draft's
/// rush flags in step with the form.
#[derive(Debug, Clone)]
pub struct ShippingCalculator {
    backend: Arc<dyn Backend>,
    orders: OrderDraftStore,
    policy: ShippingPolicy,
}

impl ShippingCalculator {
    pub fn new(backend: Arc<dyn Backend>, orders: OrderDraftStore, policy: ShippingPolicy) -> Self {
        Self {
            backend,
            orders,
            policy,
        }
    }

    pub fn policy(&self) -> &ShippingPolicy {
        &self.policy
    }

    /// Price the persisted order for `province`.
    ///
    /// An empty province is a zero breakdown without a backend call. The
    /// persisted draft's rush state is first reconciled with `drafts` and
    /// saved back.
    pub async fn compute(
        &self,
        province: &str,
        cart_lines: &[CartLine],
        drafts: &[OrderLineDraft],
    ) -> Result<ShippingBreakdown, CommerceError> {
        if province.trim().is_empty() {
            return Ok(ShippingBreakdown::zero());
        }
        let province = Province::parse(province)?;

        let mut order = self.orders.load().ok_or(CommerceError::MissingDraft("order"))?;
        order.reconcile_rush(drafts);
        if let Err(error) = self.orders.save(&order) {
            tracing::warn!(%error, "failed to persist reconciled order draft");
        }

        let quote = self
            .backend
            .recalculate(province, &order)
            .await
            .map_err(CommerceError::unavailable("recalculate shipping"))?;
        let breakdown = ShippingBreakdown::from_quote(quote);

        let priced: Vec<CartLine> = cart_lines
            .iter()
            .filter(|l| order.line(l.product_id()).is_some())
            .cloned()
            .collect();
        if priced.len() == order.lines.len() {
            let expected = self
                .policy
                .quote(province, &priced, &order.lines, order.total_before_vat)?;
            if expected.regular_shipping != breakdown.regular_shipping
                || expected.rush_shipping != breakdown.rush_shipping
            {
                tracing::warn!(
                    province = %province,
                    backend_regular = breakdown.regular_shipping.amount,
                    backend_rush = breakdown.rush_shipping.amount,
                    expected_regular = expected.regular_shipping.amount,
                    expected_rush = expected.rush_shipping.amount,
                    "backend shipping differs from local tariff"
                );
            }
        } else {
            tracing::debug!("order lines missing from cart, skipping tariff check");
        }

        tracing::debug!(
            province = %province,
            total = breakdown.total_shipping.amount,
            "shipping priced"
        );
        Ok(breakdown)
    }
}
