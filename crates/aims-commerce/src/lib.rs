//! Cart, shipping and checkout core for the AIMS storefront.
//!
//! - **Cart**: a persisted, shareable cart driven by [`cart::CartCommand`]s
//! - **Shipping**: the weight/province tariff and the backend-priced calculator
//! - **Checkout**: order and delivery drafts, the checkout flow, payment
//!   redirect and single-flight order finalization
//!
//! # Example
//!
//! ```rust,ignore
//! use aims_commerce::prelude::*;
//!
//! let storefront = Storefront::from_config(StorefrontConfig::from_env(None)?)?;
//! storefront.cart().add_to_cart(product, 1).await?;
//!
//! let checkout = storefront.checkout();
//! let mut session = checkout.begin().await?;
//! session.set_delivery(delivery)?;
//! checkout.reprice(&mut session).await?;
//! let redirect = checkout.place_order(&mut session).await?;
//! println!("pay at {}", redirect.payment_url);
//! ```

pub mod app;
pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod ids;
pub mod logging;
pub mod money;
pub mod weight;

pub use app::Storefront;
pub use error::{CommerceError, ErrorKind};
pub use ids::*;
pub use money::{Currency, Money};
pub use weight::Weight;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::app::Storefront;
    pub use crate::config::StorefrontConfig;
    pub use crate::error::{CommerceError, ErrorKind};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::weight::Weight;

    // Catalog
    pub use crate::catalog::{Product, ProductDetail, ProductKind};

    // Cart
    pub use crate::cart::{Cart, CartCommand, CartLine, CartStore, CartTotals};

    // Checkout
    pub use crate::checkout::{
        CancellationResult, Checkout, CheckoutSession, CheckoutStep, DeliveryDraft,
        DeliveryInformation, FinalizeOutcome, Order, OrderConfirmation, OrderDraft,
        OrderLineDraft, PaymentMethod, PaymentRedirect, Province, ShippingBreakdown,
    };

    // Backend
    pub use crate::backend::{Backend, HttpBackend};
}
