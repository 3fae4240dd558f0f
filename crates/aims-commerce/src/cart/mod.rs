//! Shopping cart module.
//!
//! Contains the cart lines, the pure command transition, pricing, and the
//! persisted store handle.

#[allow(clippy::module_inception)]
mod cart;
mod pricing;
mod store;

pub use cart::{Cart, CartCommand, CartLine};
pub use pricing::CartTotals;
pub use store::{CartStore, CART_KEY};
