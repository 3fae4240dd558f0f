//! Cart pricing calculations.

use crate::cart::cart::sum_subtotals;
use crate::cart::CartLine;
use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Pre-shipping totals for a set of cart lines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of line subtotals, before VAT.
    pub subtotal: Money,
    /// VAT on the subtotal.
    pub vat: Money,
    /// `subtotal + vat`.
    pub total: Money,
}

impl CartTotals {
    /// Price the given lines with `vat_percent` VAT.
    ///
    /// ```
    /// use aims_commerce::cart::CartTotals;
    /// let totals = CartTotals::for_selection(&[], 10).unwrap();
    /// assert!(totals.total.is_zero());
    /// ```
    pub fn for_selection(lines: &[CartLine], vat_percent: u32) -> Result<Self, CommerceError> {
        let subtotal = sum_subtotals(lines.iter())?;
        Self::from_subtotal(subtotal, vat_percent)
    }

    /// Totals for an already summed subtotal.
    pub fn from_subtotal(subtotal: Money, vat_percent: u32) -> Result<Self, CommerceError> {
        let vat = subtotal
            .percentage(vat_percent)
            .ok_or(CommerceError::Overflow)?;
        let total = subtotal.try_add(&vat).ok_or(CommerceError::Overflow)?;
        Ok(Self {
            subtotal,
            vat,
            total,
        })
    }

    /// Add a shipping fee to both the pre- and post-VAT figures.
    pub fn with_shipping(&self, shipping: Money) -> Result<Self, CommerceError> {
        Ok(Self {
            subtotal: self
                .subtotal
                .try_add(&shipping)
                .ok_or(CommerceError::Overflow)?,
            vat: self.vat,
            total: self.total.try_add(&shipping).ok_or(CommerceError::Overflow)?,
        })
    }
}
