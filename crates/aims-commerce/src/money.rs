//! Money type for representing monetary values.
//!
//! Amounts are integers in the smallest unit of the currency. VND has no
//! minor unit, so for the storefront's default currency one unit is one dong.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    VND,
}

impl Currency {
    /// Get the currency code (e.g., "VND").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::VND => "VND",
        }
    }

    /// Get the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::VND => "\u{20ab}",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub const fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// An amount in Vietnamese dong.
    pub const fn vnd(amount: i64) -> Self {
        Self::new(amount, Currency::VND)
    }

    /// Create a zero amount in the given currency.
    pub const fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// Try to add another Money value.
    ///
    /// Returns `None` on currency mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_sub(other.amount)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Try to multiply by a scalar (e.g. a quantity).
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Calculate `percent`% of this amount, rounding half away from zero.
    ///
    /// ```
    /// use aims_commerce::money::Money;
    /// assert_eq!(Money::vnd(250_000).percentage(10), Some(Money::vnd(25_000)));
    /// assert_eq!(Money::vnd(15).percentage(10), Some(Money::vnd(2)));
    /// ```
    pub fn percentage(&self, percent: u32) -> Option<Money> {
        let scaled = i128::from(self.amount) * i128::from(percent);
        let half = if scaled < 0 { -50 } else { 50 };
        let rounded = (scaled + half) / 100;
        i64::try_from(rounded)
            .ok()
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Clamp negative amounts to zero.
    pub fn floor_zero(&self) -> Money {
        Money::new(self.amount.max(0), self.currency)
    }

    /// The smaller of two amounts. Currencies are assumed to match.
    pub fn min(self, other: Money) -> Money {
        if other.amount < self.amount {
            other
        } else {
            self
        }
    }

    /// Sum an iterator of Money values, `None` on mismatch or overflow.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>, currency: Currency) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }

    /// Format for display, following the vi-VN convention (`250.000 ₫`).
    pub fn display(&self) -> String {
        let sign = if self.amount < 0 { "-" } else { "" };
        format!(
            "{}{} {}",
            sign,
            group_thousands(self.amount.unsigned_abs()),
            self.currency.symbol()
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Serde adapter for the backend's bare-number VND amounts.
///
/// Serializes as an integer; accepts integers and floats (rounded) so that
/// `250000` and `250000.0` both read as 250,000 dong.
pub mod vnd {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
    }

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(money.amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Int(amount) => Ok(Money::vnd(amount)),
            Raw::Float(amount) if amount.is_finite() => Ok(Money::vnd(amount.round() as i64)),
            Raw::Float(amount) => Err(serde::de::Error::custom(format!(
                "amount is not a finite number: {}",
                amount
            ))),
        }
    }
}
