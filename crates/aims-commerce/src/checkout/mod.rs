//! Checkout module.
//!
//! Contains the delivery and order drafts, shipping pricing, the checkout
//! flow and post-payment finalization.

mod cancel;
mod confirmation;
mod draft;
mod drafts;
mod flow;
mod guard;
mod orchestrator;
mod province;
mod shipping;

pub use cancel::{CancellationResult, CANCEL_OK};
pub use confirmation::{FinalizeOutcome, FinalizedOrder, OrderConfirmation, OrderDetails};
pub use draft::{
    DeliveryDraft, DeliveryInformation, Order, OrderDraft, OrderLineDraft, OrderStatus,
    PaymentMethod, RUSH_DELIVERY_SLOTS,
};
pub use drafts::{DeliveryDraftStore, DraftStore, OrderDraftStore, DELIVERY_KEY, ORDER_KEY};
pub use flow::{CheckoutSession, CheckoutStep};
pub use guard::SingleFlight;
pub use orchestrator::{Checkout, PaymentRedirect};
pub use province::{Province, PROVINCES};
pub use shipping::{ShippingBreakdown, ShippingCalculator, ShippingPolicy};
