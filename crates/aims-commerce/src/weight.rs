//! Shipping weight, held as whole grams.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative weight in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Weight {
    grams: i64,
}

impl Weight {
    /// Zero grams.
    pub const ZERO: Weight = Weight { grams: 0 };

    /// A weight in grams; negative inputs clamp to zero.
    pub const fn grams(grams: i64) -> Self {
        Self {
            grams: if grams < 0 { 0 } else { grams },
        }
    }

    /// Parse a kilogram figure, rounding to the nearest gram.
    pub fn from_kg(kg: f64) -> Self {
        if !kg.is_finite() {
            return Self::ZERO;
        }
        Self::grams((kg * 1000.0).round() as i64)
    }

    /// The weight in grams.
    pub fn as_grams(&self) -> i64 {
        self.grams
    }

    /// The weight in kilograms.
    pub fn as_kg(&self) -> f64 {
        self.grams as f64 / 1000.0
    }

    /// Multiply by a quantity, saturating.
    pub fn times(&self, quantity: i64) -> Weight {
        Weight::grams(self.grams.saturating_mul(quantity.max(0)))
    }

    /// Add, saturating.
    pub fn plus(&self, other: Weight) -> Weight {
        Weight::grams(self.grams.saturating_add(other.grams))
    }

    /// Number of started `step`s above `tier`.
    ///
    /// Partial steps count as whole ones; a weight at or below `tier` has no
    /// increments.
    ///
    /// ```
    /// use aims_commerce::weight::Weight;
    /// let tier = Weight::grams(3000);
    /// let step = Weight::grams(500);
    /// assert_eq!(Weight::grams(3000).increments_above(tier, step), 0);
    /// assert_eq!(Weight::grams(3010).increments_above(tier, step), 1);
    /// assert_eq!(Weight::grams(3500).increments_above(tier, step), 1);
    /// assert_eq!(Weight::grams(3501).increments_above(tier, step), 2);
    /// ```
    pub fn increments_above(&self, tier: Weight, step: Weight) -> i64 {
        let excess = self.grams - tier.grams;
        if excess <= 0 || step.grams <= 0 {
            return 0;
        }
        (excess + step.grams - 1) / step.grams
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}kg", self.as_kg())
    }
}

/// Serde adapter for the backend's kilogram floats.
pub mod kg {
    use super::Weight;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(weight: &Weight, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(weight.as_kg())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weight, D::Error> {
        Ok(Weight::from_kg(f64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kg_rounds_to_gram() {
        assert_eq!(Weight::from_kg(0.3).as_grams(), 300);
        assert_eq!(Weight::from_kg(3.01).as_grams(), 3010);
        assert_eq!(Weight::from_kg(0.1234).as_grams(), 123);
        assert_eq!(Weight::from_kg(-1.0), Weight::ZERO);
        assert_eq!(Weight::from_kg(f64::NAN), Weight::ZERO);
    }

    #[test]
    fn test_times_quantity() {
        assert_eq!(Weight::from_kg(0.35).times(3).as_grams(), 1050);
        assert_eq!(Weight::from_kg(0.35).times(-1), Weight::ZERO);
    }

    #[test]
    fn test_increments_first_half_kilo_tier() {
        let tier = Weight::grams(500);
        let step = Weight::grams(500);
        assert_eq!(Weight::grams(120).increments_above(tier, step), 0);
        assert_eq!(Weight::grams(500).increments_above(tier, step), 0);
        assert_eq!(Weight::grams(501).increments_above(tier, step), 1);
        assert_eq!(Weight::grams(1000).increments_above(tier, step), 1);
        assert_eq!(Weight::grams(1001).increments_above(tier, step), 2);
    }

    #[test]
    fn test_kg_serde() {
        #[derive(Serialize, Deserialize)]
        struct Wire {
            #[serde(with = "kg")]
            weight: Weight,
        }

        let wire: Wire = serde_json::from_str(r#"{"weight": 0.35}"#).unwrap();
        assert_eq!(wire.weight.as_grams(), 350);
        assert_eq!(serde_json::to_string(&wire).unwrap(), r#"{"weight":0.35}"#);
    }
}
