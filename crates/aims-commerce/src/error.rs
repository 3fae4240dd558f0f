//! Commerce error types.

use crate::ids::ProductId;
use crate::checkout::CheckoutStep;
use thiserror::Error;

/// How a failure should be handled by the checkout surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected locally and shown inline; nothing reached the backend.
    Validation,
    /// A non-critical read failed; prior state is kept and the user may retry.
    Transient,
    /// A checkout-completing call failed; the transition is aborted.
    Critical,
    /// Local persistence failed.
    Storage,
}

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found in the cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(ProductId),

    /// Checkout started with nothing selected.
    #[error("No cart items selected for checkout")]
    EmptySelection,

    /// Unknown destination province.
    #[error("Unknown province: {0:?}")]
    UnknownProvince(String),

    /// A rush-flagged line is missing its delivery slot.
    #[error("Rush delivery for product {0} requires a delivery time")]
    MissingDeliveryTime(ProductId),

    /// Rush requested for a product that does not support it.
    #[error("Product {0} does not support rush delivery")]
    RushNotSupported(ProductId),

    /// Invalid checkout state transition.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition { from: CheckoutStep, to: CheckoutStep },

    /// A persisted draft the step depends on is missing.
    #[error("No {0} draft in progress")]
    MissingDraft(&'static str),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// A backend call that must succeed for the checkout to move on failed.
    #[error("{operation} failed: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: aims_data::FetchError,
    },

    /// The backend answered with an order that does not cover the selection.
    #[error("Order draft does not match the selection: {0}")]
    DraftMismatch(String),

    /// A backend read that the checkout can live without failed.
    #[error("{operation} unavailable: {source}")]
    BackendUnavailable {
        operation: &'static str,
        #[source]
        source: aims_data::FetchError,
    },

    /// Cache error.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl CommerceError {
    /// Classify the error for the checkout surface.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommerceError::ItemNotInCart(_)
            | CommerceError::EmptySelection
            | CommerceError::UnknownProvince(_)
            | CommerceError::MissingDeliveryTime(_)
            | CommerceError::RushNotSupported(_)
            | CommerceError::InvalidCheckoutTransition { .. }
            | CommerceError::MissingDraft(_)
            | CommerceError::Overflow
            | CommerceError::ValidationError(_) => ErrorKind::Validation,
            CommerceError::BackendUnavailable { .. } => ErrorKind::Transient,
            CommerceError::Backend { .. } | CommerceError::DraftMismatch(_) => {
                ErrorKind::Critical
            }
            CommerceError::CacheError(_) | CommerceError::SerializationError(_) => {
                ErrorKind::Storage
            }
        }
    }

    /// True if the user can fix the input and try again without a reload.
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub(crate) fn backend(operation: &'static str) -> impl FnOnce(aims_data::FetchError) -> Self {
        move |source| CommerceError::Backend { operation, source }
    }

    pub(crate) fn unavailable(
        operation: &'static str,
    ) -> impl FnOnce(aims_data::FetchError) -> Self {
        move |source| CommerceError::BackendUnavailable { operation, source }
    }
}

impl From<aims_cache::CacheError> for CommerceError {
    fn from(e: aims_cache::CacheError) -> Self {
        CommerceError::CacheError(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aims_data::FetchError;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CommerceError::MissingDeliveryTime(ProductId::new(1)).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            CommerceError::backend("submit delivery")(FetchError::Timeout).kind(),
            ErrorKind::Critical
        );
        assert_eq!(
            CommerceError::unavailable("recalculate shipping")(FetchError::Timeout).kind(),
            ErrorKind::Transient
        );
        assert_eq!(
            CommerceError::from(aims_cache::CacheError::StoreError("disk full".into())).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn test_error_display() {
        let err = CommerceError::InvalidCheckoutTransition {
            from: CheckoutStep::CartSelected,
            to: CheckoutStep::OrderFinalized,
        };
        assert_eq!(
            err.to_string(),
            "Invalid checkout transition from cart_selected to order_finalized"
        );
    }
}
