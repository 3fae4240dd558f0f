//! Order and delivery drafts.
//!
//! A checkout attempt assembles an [`OrderDraft`] and a [`DeliveryDraft`] on
//! the client. Both are persisted between page loads and only become an
//! [`Order`] once the backend hands out an order id.

use crate::cart::{CartLine, CartTotals};
use crate::checkout::Province;
use crate::error::CommerceError;
use crate::ids::{DeliveryId, OrderId, ProductId};
use crate::money::{self, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Two-hour windows a rush delivery can be booked into.
pub const RUSH_DELIVERY_SLOTS: [&str; 6] = [
    "08:00 - 10:00",
    "10:00 - 12:00",
    "12:00 - 14:00",
    "14:00 - 16:00",
    "16:00 - 18:00",
    "18:00 - 20:00",
];

/// Order and order line status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// How the shopper intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cod,
    Momo,
    Vnpay,
}

impl PaymentMethod {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Momo => "momo",
            PaymentMethod::Vnpay => "vnpay",
        }
    }

    /// Label shown at checkout.
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "Cash on Delivery (COD)",
            PaymentMethod::Momo => "MoMo E-Wallet",
            PaymentMethod::Vnpay => "VNPay",
        }
    }
}

/// One line of an order being assembled.
///
/// `delivery_time` is only ever set while the line is flagged rush; turning
/// rush off clears it together with `instructions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLineDraft {
    product_id: ProductId,
    #[serde(default, deserialize_with = "null_as_default")]
    status: OrderStatus,
    quantity: i64,
    #[serde(alias = "total_Fee", with = "money::vnd")]
    total_fee: Money,
    #[serde(alias = "rush_order", default)]
    rush_order_using: bool,
    #[serde(default)]
    delivery_time: Option<String>,
    #[serde(default)]
    instructions: Option<String>,
}

impl OrderLineDraft {
    /// A pending, non-rush line for `quantity` units at `unit_price`.
    pub fn new(product_id: ProductId, quantity: i64, unit_price: Money) -> Result<Self, CommerceError> {
        let total_fee = unit_price
            .try_multiply(quantity)
            .ok_or(CommerceError::Overflow)?;
        Ok(Self {
            product_id,
            status: OrderStatus::Pending,
            quantity,
            total_fee,
            rush_order_using: false,
            delivery_time: None,
            instructions: None,
        })
    }

    /// A line for a cart line at its current price.
    pub fn from_cart_line(line: &CartLine) -> Result<Self, CommerceError> {
        Self::new(line.product_id(), line.quantity, line.product.price)
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// `unit price × quantity`.
    pub fn total_fee(&self) -> Money {
        self.total_fee
    }

    /// True if the line is flagged rush, booked or not.
    pub fn is_rush(&self) -> bool {
        self.rush_order_using
    }

    /// Booked rush slot, if any.
    pub fn delivery_time(&self) -> Option<&str> {
        self.delivery_time.as_deref()
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    /// Flag or unflag the line for rush delivery.
    pub fn set_rush(&mut self, rush: bool) {
        self.rush_order_using = rush;
        if !rush {
            self.delivery_time = None;
            self.instructions = None;
        }
    }

    /// Book a rush slot. The line must already be flagged rush.
    pub fn set_delivery_time(&mut self, slot: &str) -> Result<(), CommerceError> {
        if !self.rush_order_using {
            return Err(CommerceError::ValidationError(format!(
                "product {} is not a rush delivery",
                self.product_id
            )));
        }
        if !RUSH_DELIVERY_SLOTS.contains(&slot) {
            return Err(CommerceError::ValidationError(format!(
                "unknown delivery slot {:?}",
                slot
            )));
        }
        self.delivery_time = Some(slot.to_string());
        Ok(())
    }

    /// Set instructions for the courier. Blank input clears them.
    pub fn set_instructions(&mut self, instructions: Option<String>) {
        self.instructions = instructions.filter(|s| !s.trim().is_empty());
    }

    /// Rush lines are priced as rush only once a slot is booked.
    pub fn is_priced_as_rush(&self) -> bool {
        self.rush_order_using && self.delivery_time.is_some()
    }

    /// A rush line without a slot cannot be submitted.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.rush_order_using && self.delivery_time.is_none() {
            return Err(CommerceError::MissingDeliveryTime(self.product_id));
        }
        Ok(())
    }

    fn take_rush_from(&mut self, live: &OrderLineDraft) {
        self.set_rush(live.rush_order_using);
        if live.rush_order_using {
            self.delivery_time = live.delivery_time.clone();
            self.instructions = live.instructions.clone();
        }
    }
}

/// The client-held snapshot of an order before the backend confirms it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(from = "OrderDraftWire")]
pub struct OrderDraft {
    /// `0` until the backend assigns one.
    pub order_id: OrderId,
    /// `0` until delivery information is stored.
    pub delivery_id: DeliveryId,
    #[serde(rename = "total_before_VAT", with = "money::vnd")]
    pub total_before_vat: Money,
    #[serde(rename = "total_after_VAT", with = "money::vnd")]
    pub total_after_vat: Money,
    /// Always `total_after_VAT - total_before_VAT` once parsed.
    #[serde(with = "money::vnd")]
    pub vat: Money,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[serde(rename = "orderLineList")]
    pub lines: Vec<OrderLineDraft>,
}

/// Inbound shape of [`OrderDraft`].
///
/// The order service sends nulls for unset ids and status, reports `vat` as
/// the rate rather than an amount, and may repeat the line list under
/// `orderlineList`.
#[derive(Deserialize)]
struct OrderDraftWire {
    #[serde(default, deserialize_with = "null_as_default")]
    order_id: OrderId,
    #[serde(default, deserialize_with = "null_as_default")]
    delivery_id: DeliveryId,
    #[serde(rename = "total_before_VAT", alias = "total_before_vat", with = "money::vnd", default)]
    total_before_vat: Money,
    #[serde(rename = "total_after_VAT", alias = "total_after_vat", with = "money::vnd", default)]
    total_after_vat: Money,
    #[serde(default, deserialize_with = "null_as_default")]
    status: OrderStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    payment_method: PaymentMethod,
    #[serde(rename = "orderLineList", default)]
    lines: Option<Vec<OrderLineDraft>>,
    #[serde(rename = "orderlineList", default)]
    lowercase_lines: Option<Vec<OrderLineDraft>>,
}

impl From<OrderDraftWire> for OrderDraft {
    fn from(wire: OrderDraftWire) -> Self {
        let vat = wire
            .total_after_vat
            .try_subtract(&wire.total_before_vat)
            .unwrap_or(Money::zero(wire.total_after_vat.currency))
            .floor_zero();
        Self {
            order_id: wire.order_id,
            delivery_id: wire.delivery_id,
            total_before_vat: wire.total_before_vat,
            total_after_vat: wire.total_after_vat,
            vat,
            status: wire.status,
            payment_method: wire.payment_method,
            lines: wire.lines.or(wire.lowercase_lines).unwrap_or_default(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl OrderDraft {
    /// Build a draft for the given lines, priced with `vat_percent` VAT.
    pub fn from_selection(lines: &[CartLine], vat_percent: u32) -> Result<Self, CommerceError> {
        let totals = CartTotals::for_selection(lines, vat_percent)?;
        let lines = lines
            .iter()
            .map(OrderLineDraft::from_cart_line)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::default().with_totals(totals).with_lines(lines))
    }

    /// Replace the lines.
    pub fn with_lines(mut self, lines: Vec<OrderLineDraft>) -> Self {
        self.lines = lines;
        self
    }

    /// Take the amounts from `totals`.
    pub fn with_totals(mut self, totals: CartTotals) -> Self {
        self.total_before_vat = totals.subtotal;
        self.vat = totals.vat;
        self.total_after_vat = totals.total;
        self
    }

    /// The draft's amounts as cart totals.
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            subtotal: self.total_before_vat,
            vat: self.vat,
            total: self.total_after_vat,
        }
    }

    /// Line for `product_id`, if present.
    pub fn line(&self, product_id: ProductId) -> Option<&OrderLineDraft> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// True if any line is flagged rush.
    pub fn has_rush_lines(&self) -> bool {
        self.lines.iter().any(OrderLineDraft::is_rush)
    }

    /// Check that the draft has exactly one line per selected cart line.
    pub fn check_selection(&self, selected: &[CartLine]) -> Result<(), CommerceError> {
        let mut expected: Vec<ProductId> = selected.iter().map(CartLine::product_id).collect();
        let mut got: Vec<ProductId> = self.lines.iter().map(|l| l.product_id).collect();
        expected.sort();
        got.sort();
        if expected != got {
            return Err(CommerceError::DraftMismatch(format!(
                "expected products {:?}, got {:?}",
                expected, got
            )));
        }
        Ok(())
    }

    /// Start every line as a regular delivery.
    pub fn clear_rush(&mut self) {
        for line in &mut self.lines {
            line.set_rush(false);
        }
    }

    /// Copy the rush state of matching `live` lines onto this draft.
    ///
    /// Lines are matched by product id; lines without a match keep their
    /// current state.
    pub fn reconcile_rush(&mut self, live: &[OrderLineDraft]) {
        for line in &mut self.lines {
            if let Some(current) = live.iter().find(|l| l.product_id == line.product_id) {
                line.take_rush_from(current);
            }
        }
    }

    /// Every rush line must carry a delivery slot.
    pub fn validate(&self) -> Result<(), CommerceError> {
        self.lines.iter().try_for_each(OrderLineDraft::validate)
    }

    /// Stamp the server-assigned id, moving the draft to its confirmed form.
    pub fn confirm(mut self, order_id: OrderId) -> Order {
        self.order_id = order_id;
        Order {
            order_id,
            confirmed_at: Utc::now(),
            draft: self,
        }
    }
}

/// An order the backend has assigned an id to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    order_id: OrderId,
    confirmed_at: DateTime<Utc>,
    draft: OrderDraft,
}

impl Order {
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// When the id was stamped on the client.
    pub fn confirmed_at(&self) -> DateTime<Utc> {
        self.confirmed_at
    }

    /// The order as submitted to the backend, carrying its id.
    pub fn submitted(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn lines(&self) -> &[OrderLineDraft] {
        &self.draft.lines
    }

    /// Amount the shopper pays before shipping.
    pub fn total_after_vat(&self) -> Money {
        self.draft.total_after_vat
    }

    pub fn status(&self) -> OrderStatus {
        self.draft.status
    }
}

/// Recipient details as typed into the delivery form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeliveryInformation {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub province: String,
    #[serde(default)]
    pub delivery_message: Option<String>,
}

impl DeliveryInformation {
    /// Check required fields; returns the parsed destination.
    pub fn validate(&self) -> Result<Province, CommerceError> {
        let required = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("email", &self.email),
            ("address", &self.address),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(CommerceError::ValidationError(format!(
                "missing {}",
                missing.join(", ")
            )));
        }
        if !self.email.contains('@') {
            return Err(CommerceError::ValidationError(format!(
                "invalid email {:?}",
                self.email
            )));
        }
        if self.province.trim().is_empty() {
            return Err(CommerceError::ValidationError("missing province".to_string()));
        }
        Province::parse(&self.province)
    }
}

/// The client-held delivery record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeliveryDraft {
    /// `0` until the backend stores it.
    #[serde(default)]
    pub delivery_id: DeliveryId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub province: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_message: Option<String>,
    #[serde(with = "money::vnd", default)]
    pub delivery_fee: Money,
}

impl DeliveryDraft {
    /// A new, unsaved record charging `delivery_fee`.
    pub fn new(info: DeliveryInformation, delivery_fee: Money) -> Self {
        Self {
            delivery_id: DeliveryId::default(),
            name: info.name,
            phone: info.phone,
            email: info.email,
            address: info.address,
            province: info.province,
            delivery_message: info.delivery_message.filter(|m| !m.trim().is_empty()),
            delivery_fee,
        }
    }

    /// True once the backend has assigned an id.
    pub fn is_saved(&self) -> bool {
        !self.delivery_id.is_unassigned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Product, ProductKind};
    use crate::weight::Weight;
    use serde_json::json;

    fn line(id: i64) -> OrderLineDraft {
        OrderLineDraft::new(ProductId::new(id), 2, Money::vnd(100_000)).unwrap()
    }

    #[test]
    fn test_line_fee() {
        assert_eq!(line(1).total_fee(), Money::vnd(200_000));
        assert_eq!(line(1).status(), OrderStatus::Pending);
    }

    #[test]
    fn test_rush_off_clears_slot_and_instructions() {
        let mut l = line(1);
        l.set_rush(true);
        l.set_delivery_time("10:00 - 12:00").unwrap();
        l.set_instructions(Some("Call first".to_string()));
        assert!(l.is_priced_as_rush());

        l.set_rush(false);
        assert_eq!(l.delivery_time(), None);
        assert_eq!(l.instructions(), None);
    }

    #[test]
    fn test_delivery_time_requires_rush() {
        let mut l = line(1);
        assert!(l.set_delivery_time("08:00 - 10:00").is_err());
        l.set_rush(true);
        assert!(l.set_delivery_time("07:00 - 08:00").is_err());
        assert!(l.set_delivery_time("08:00 - 10:00").is_ok());
    }

    #[test]
    fn test_validate_rush_without_slot() {
        let mut draft = OrderDraft::default().with_lines(vec![line(1), line(2)]);
        assert!(draft.validate().is_ok());

        draft.lines[1].set_rush(true);
        assert!(matches!(
            draft.validate(),
            Err(CommerceError::MissingDeliveryTime(id)) if id == ProductId::new(2)
        ));
    }

    #[test]
    fn test_reconcile_rush() {
        let mut persisted = OrderDraft::default().with_lines(vec![line(1), line(2)]);
        let mut live = line(1);
        live.set_rush(true);

        persisted.reconcile_rush(&[live]);
        assert!(persisted.line(ProductId::new(1)).unwrap().is_rush());
        assert!(!persisted.line(ProductId::new(2)).unwrap().is_rush());
    }

    #[test]
    fn test_reconcile_from_wire_names() {
        let mut persisted: OrderDraft = serde_json::from_value(json!({
            "order_id": 0,
            "delivery_id": 0,
            "total_before_VAT": 250000,
            "total_after_VAT": 275000,
            "vat": 25000,
            "status": "pending",
            "orderLineList": [
                {"product_id": 1, "status": "pending", "quantity": 1, "total_fee": 250000, "rush_order_using": false}
            ]
        }))
        .unwrap();
        let live: OrderLineDraft = serde_json::from_value(json!({
            "product_id": 1, "status": "pending", "quantity": 1, "total_Fee": 250000,
            "rush_order": true, "delivery_time": null, "instructions": null
        }))
        .unwrap();

        persisted.reconcile_rush(&[live]);
        let value = serde_json::to_value(&persisted).unwrap();
        assert_eq!(value["orderLineList"][0]["rush_order_using"], true);
        assert_eq!(value["total_after_VAT"], 275000);
    }

    #[test]
    fn test_from_selection() {
        let product = Product::new(
            ProductId::new(1),
            "Book",
            ProductKind::Book,
            Money::vnd(250_000),
            Weight::grams(300),
        );
        let draft = OrderDraft::from_selection(&[CartLine::new(product, 1)], 10).unwrap();
        assert_eq!(draft.total_before_vat, Money::vnd(250_000));
        assert_eq!(draft.vat, Money::vnd(25_000));
        assert_eq!(draft.total_after_vat, Money::vnd(275_000));
        assert!(draft.order_id.is_unassigned());
        assert_eq!(draft.lines.len(), 1);
    }

    #[test]
    fn test_check_selection() {
        let product = |id| {
            Product::new(
                ProductId::new(id),
                "Book",
                ProductKind::Book,
                Money::vnd(100_000),
                Weight::grams(300),
            )
        };
        let selected = [CartLine::new(product(2), 1), CartLine::new(product(1), 2)];

        let draft = OrderDraft::default().with_lines(vec![line(1), line(2)]);
        assert!(draft.check_selection(&selected).is_ok());

        let short = OrderDraft::default().with_lines(vec![line(1)]);
        let err = short.check_selection(&selected).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Critical);

        let duplicated = OrderDraft::default().with_lines(vec![line(1), line(1)]);
        assert!(duplicated.check_selection(&selected).is_err());
    }

    #[test]
    fn test_clear_rush() {
        let mut draft = OrderDraft::default().with_lines(vec![line(1), line(2)]);
        draft.lines[0].set_rush(true);
        draft.lines[0].set_delivery_time("08:00 - 10:00").unwrap();

        draft.clear_rush();
        assert!(!draft.has_rush_lines());
        assert_eq!(draft.lines[0].delivery_time(), None);
    }

    #[test]
    fn test_confirm_stamps_id() {
        let draft = OrderDraft::default().with_lines(vec![line(1)]);
        let order = draft.clone().confirm(OrderId::new(10001));

        assert!(draft.order_id.is_unassigned());
        assert_eq!(order.order_id(), OrderId::new(10001));
        assert_eq!(order.submitted().order_id, OrderId::new(10001));
        assert_eq!(order.lines(), draft.lines.as_slice());
    }

    #[test]
    fn test_delivery_information_validation() {
        let mut info = DeliveryInformation {
            name: "Nguyễn Văn A".into(),
            phone: "0912345678".into(),
            email: "a@example.com".into(),
            address: "1 Tràng Tiền".into(),
            province: "Hà Nội".into(),
            delivery_message: None,
        };
        assert!(info.validate().unwrap().is_metropolitan());

        info.email = "not-an-email".into();
        assert!(info.validate().is_err());

        info.email = "a@example.com".into();
        info.province = String::new();
        assert!(info.validate().unwrap_err().is_validation());

        info.phone = " ".into();
        let err = info.validate().unwrap_err();
        assert!(err.to_string().contains("phone"));
    }

    #[test]
    fn test_delivery_draft_wire_shape() {
        let draft = DeliveryDraft::new(
            DeliveryInformation {
                name: "A".into(),
                phone: "1".into(),
                email: "a@b".into(),
                address: "x".into(),
                province: "Hà Nội".into(),
                delivery_message: Some("  ".into()),
            },
            Money::vnd(22_000),
        );
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["delivery_id"], 0);
        assert_eq!(value["delivery_fee"], 22000);
        assert!(value.get("delivery_message").is_none());
        assert!(!draft.is_saved());
    }
}
