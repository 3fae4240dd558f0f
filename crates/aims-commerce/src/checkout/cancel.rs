//! Order cancellation results.

use crate::backend::CancelResponse;
use crate::ids::OrderId;
use crate::money::Money;
use serde::Serialize;

/// Gateway code for an accepted cancellation.
pub const CANCEL_OK: &str = "00";

/// What the shopper is told after asking to cancel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancellationResult {
    pub order_id: OrderId,
    pub success: bool,
    pub response_code: Option<String>,
    pub message: Option<String>,
    /// Amount refunded, when the gateway reports one.
    pub refund: Option<Money>,
}

impl CancellationResult {
    pub fn from_response(order_id: OrderId, response: CancelResponse) -> Self {
        let success = response.response_code.as_deref() == Some(CANCEL_OK);
        Self {
            order_id,
            success,
            // vnp_Amount is in hundredths of a dong.
            refund: response
                .amount
                .filter(|a| *a > 0)
                .map(|a| Money::vnd(a / 100)),
            response_code: response.response_code,
            message: response.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted() {
        let result = CancellationResult::from_response(
            OrderId::new(7),
            CancelResponse {
                response_code: Some("00".into()),
                message: Some("Refund success".into()),
                amount: Some(29_700_000),
            },
        );
        assert!(result.success);
        assert_eq!(result.refund, Some(Money::vnd(297_000)));
    }

    #[test]
    fn test_rejected() {
        let result = CancellationResult::from_response(
            OrderId::new(7),
            CancelResponse {
                response_code: Some("94".into()),
                message: None,
                amount: None,
            },
        );
        assert!(!result.success);
        assert_eq!(result.refund, None);

        let empty = CancellationResult::from_response(OrderId::new(7), CancelResponse::default());
        assert!(!empty.success);
    }
}
