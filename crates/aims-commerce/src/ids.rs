//! Newtype IDs for type-safe identifiers.
//!
//! The backend numbers every entity with a plain integer. Wrapping each kind
//! in its own type prevents passing a `ProductId` where an `OrderId` is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to generate numeric newtype ID structs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from its numeric value.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the numeric value.
            pub const fn get(&self) -> i64 {
                self.0
            }

            /// The backend uses `0` for "not assigned yet".
            pub const fn is_unassigned(&self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

define_id!(
    /// Catalog product identifier.
    ProductId
);
define_id!(
    /// Server-assigned order identifier.
    OrderId
);
define_id!(
    /// Server-assigned delivery record identifier.
    DeliveryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new(42);
        assert_eq!(id.get(), 42);
        assert!(!id.is_unassigned());
        assert!(DeliveryId::default().is_unassigned());
    }

    #[test]
    fn test_id_from_str() {
        let id: OrderId = " 10001 ".parse().unwrap();
        assert_eq!(id, OrderId::new(10001));
        assert!("abc".parse::<OrderId>().is_err());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(format!("{}", ProductId::new(7)), "7");
    }

    #[test]
    fn test_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ProductId::new(3)).unwrap(), "3");
        let id: DeliveryId = serde_json::from_str("12").unwrap();
        assert_eq!(id, DeliveryId::new(12));
    }
}
