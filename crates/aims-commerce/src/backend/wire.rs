//! Request and response bodies exchanged with the order backend.

use crate::cart::CartLine;
use crate::catalog::Product;
use crate::checkout::{DeliveryDraft, OrderDraft};
use crate::money::{self, Money};
use serde::{Deserialize, Deserializer, Serialize};

/// `POST /recalculate` body.
#[derive(Debug, Serialize)]
pub struct RecalculateRequest<'a> {
    pub province: &'a str,
    pub order: &'a OrderDraft,
}

/// Shipping figures as priced by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    #[serde(with = "money::vnd")]
    pub regular_shipping: Money,
    #[serde(with = "money::vnd")]
    pub rush_shipping: Money,
    #[serde(with = "money::vnd")]
    pub total_shipping: Money,
}

/// `POST /deliveryinfo` response.
#[derive(Debug, Deserialize)]
pub struct DeliveryInfoResponse {
    pub delivery_information: DeliveryDraft,
}

/// A cart line as `/placeorder` expects it: no selection flag.
#[derive(Debug, Serialize)]
pub struct PlacedItem<'a> {
    pub product: &'a Product,
    pub quantity: i64,
}

/// `POST /placeorder` body.
#[derive(Debug, Serialize)]
pub struct PlaceOrderRequest<'a> {
    #[serde(rename = "listofProducts")]
    pub list_of_products: Vec<PlacedItem<'a>>,
}

impl<'a> PlaceOrderRequest<'a> {
    pub fn new(lines: &'a [CartLine]) -> Self {
        Self {
            list_of_products: lines
                .iter()
                .map(|l| PlacedItem {
                    product: &l.product,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}

/// `POST /placeorder` response.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderResponse {
    pub order: OrderDraft,
}

/// `POST /finish-order` body.
#[derive(Debug, Serialize)]
pub struct FinishOrderRequest<'a> {
    pub order: &'a OrderDraft,
    #[serde(rename = "deliveryInformation")]
    pub delivery_information: &'a DeliveryDraft,
}

/// `POST /api/payment` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    #[serde(with = "money::vnd")]
    pub amount: Money,
    #[serde(rename = "bankCode")]
    pub bank_code: String,
    pub language: String,
    #[serde(rename = "vnp_Version")]
    pub version: String,
}

/// `POST /api/payment` response.
#[derive(Debug, Deserialize)]
pub struct PaymentResponse {
    #[serde(rename = "paymentUrl")]
    pub payment_url: String,
}

/// Gateway-style answer to `POST /api/order/cancel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CancelResponse {
    #[serde(rename = "vnp_ResponseCode", default)]
    pub response_code: Option<String>,
    #[serde(rename = "vnp_Message", default)]
    pub message: Option<String>,
    /// Refunded amount in hundredths of a dong.
    #[serde(rename = "vnp_Amount", default, deserialize_with = "lenient_amount")]
    pub amount: Option<i64>,
}

/// The gateway sends `vnp_Amount` as a string of digits; accept a bare number
/// too.
fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid vnp_Amount {:?}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_from_backend_names() {
        let quote: ShippingQuote = serde_json::from_value(json!({
            "regularShipping": 22000,
            "rushShipping": 0,
            "totalShipping": 0.0
        }))
        .unwrap();
        assert_eq!(quote.regular_shipping, Money::vnd(22_000));
        assert!(quote.total_shipping.is_zero());
    }

    #[test]
    fn test_place_order_reply_from_order_service() {
        let line = json!({
            "odrline_id": 0, "order_id": 0, "product_id": 1, "status": "pending",
            "rush_order_using": false, "quantity": 2, "total_fee": 500000,
            "delivery_time": null, "instructions": null
        });
        let reply: PlaceOrderResponse = serde_json::from_value(json!({
            "order": {
                "order_id": 0,
                "total_before_VAT": 500000,
                "total_after_VAT": 550000,
                "status": "pending",
                "delivery_id": null,
                "vat": 10,
                "orderlineList": [line.clone()],
                "orderLineList": [line]
            }
        }))
        .unwrap();

        let order = reply.order;
        assert!(order.delivery_id.is_unassigned());
        assert_eq!(order.vat, Money::vnd(50_000));
        assert_eq!(order.totals().total, Money::vnd(550_000));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].total_fee(), Money::vnd(500_000));

        let sent = serde_json::to_value(&order).unwrap();
        assert_eq!(sent["vat"], 50000);
        assert_eq!(sent["delivery_id"], 0);
        assert!(sent.get("orderlineList").is_none());
    }

    #[test]
    fn test_place_order_reply_lowercase_list_only() {
        let reply: PlaceOrderResponse = serde_json::from_value(json!({
            "order": {
                "total_before_VAT": 120000,
                "total_after_VAT": 132000,
                "status": null,
                "orderlineList": [
                    {"product_id": 2, "status": null, "rush_order_using": false,
                     "quantity": 1, "total_fee": 120000}
                ]
            }
        }))
        .unwrap();
        assert_eq!(reply.order.lines.len(), 1);
        assert_eq!(reply.order.vat, Money::vnd(12_000));
    }

    #[test]
    fn test_payment_request_names() {
        let body = PaymentRequest {
            amount: Money::vnd(297_000),
            bank_code: "NCB".into(),
            language: "vn".into(),
            version: "2.1.0".into(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"amount": 297000, "bankCode": "NCB", "language": "vn", "vnp_Version": "2.1.0"})
        );
    }

    #[test]
    fn test_cancel_amount_string_or_number() {
        let r: CancelResponse =
            serde_json::from_value(json!({"vnp_ResponseCode": "00", "vnp_Amount": "29700000"}))
                .unwrap();
        assert_eq!(r.amount, Some(29_700_000));

        let r: CancelResponse = serde_json::from_value(json!({"vnp_Amount": 100})).unwrap();
        assert_eq!(r.amount, Some(100));

        let r: CancelResponse = serde_json::from_value(json!({"vnp_ResponseCode": "94"})).unwrap();
        assert_eq!(r.amount, None);
        assert_eq!(r.response_code.as_deref(), Some("94"));
    }
}
