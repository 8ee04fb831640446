//! Value objects: equality by value, not identity.
//!
//! Quantities and unit prices carry no identity; two quantities of `3` are the
//! same quantity. Both validate on construction so the rest of the workspace
//! never has to re-check them.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one (`Quantity::incremented`, `Quantity::decremented`).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Number of units of a product in the cart.
///
/// A zero quantity is representable because callers use it to express "remove
/// this item" (stepper decremented past one, candidate not yet added). Stored
/// line items always hold a quantity of at least one; `CartLineItem` enforces
/// that.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// One more unit. Fails instead of wrapping at `u32::MAX`.
    pub fn incremented(self) -> DomainResult<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| DomainError::invariant("quantity overflow"))
    }

    /// One less unit, saturating at zero.
    pub const fn decremented(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl ValueObject for Quantity {}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Parses the text encoding used by persisted records (`"3"`).
impl FromStr for Quantity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|e| DomainError::validation(format!("quantity '{s}': {e}")))
    }
}

/// Non-negative price of one unit of a product.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct UnitPrice(Decimal);

impl UnitPrice {
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation(format!(
                "unit price must not be negative (got {amount})"
            )));
        }
        Ok(Self(amount))
    }

    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Exact `unit price × quantity`, no rounding.
    ///
    /// Fails when the product does not fit in a `Decimal`.
    pub fn line_total(self, quantity: Quantity) -> DomainResult<Decimal> {
        self.0.checked_mul(Decimal::from(quantity.get())).ok_or_else(|| {
            DomainError::invariant(format!("line total of {} x {quantity} overflows", self.0))
        })
    }
}

impl ValueObject for UnitPrice {}

impl TryFrom<Decimal> for UnitPrice {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UnitPrice> for Decimal {
    fn from(value: UnitPrice) -> Self {
        value.0
    }
}

impl FromStr for UnitPrice {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim())
            .map_err(|e| DomainError::validation(format!("unit price '{s}': {e}")))?;
        Self::new(amount)
    }
}

impl core::fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn quantity_parses_record_text() {
        assert_eq!("3".parse::<Quantity>().unwrap(), Quantity::new(3));
        assert_eq!(" 0 ".parse::<Quantity>().unwrap(), Quantity::ZERO);
    }

    #[test]
    fn quantity_rejects_negative_and_garbage() {
        assert!("-1".parse::<Quantity>().is_err());
        assert!("two".parse::<Quantity>().is_err());
        assert!("".parse::<Quantity>().is_err());
        assert!("1.5".parse::<Quantity>().is_err());
    }

    #[test]
    fn decrement_saturates_at_zero() {
        assert_eq!(Quantity::ONE.decremented(), Quantity::ZERO);
        assert_eq!(Quantity::ZERO.decremented(), Quantity::ZERO);
    }

    #[test]
    fn increment_refuses_to_wrap() {
        assert!(Quantity::new(u32::MAX).incremented().is_err());
        assert_eq!(Quantity::ONE.incremented().unwrap(), Quantity::new(2));
    }

    #[test]
    fn unit_price_rejects_negative_amounts() {
        assert!(UnitPrice::new(Decimal::new(-1, 2)).is_err());
        assert!(UnitPrice::new(Decimal::ZERO).is_ok());
        assert!("-3.50".parse::<UnitPrice>().is_err());
    }

    #[test]
    fn line_total_is_exact() {
        let price: UnitPrice = "0.10".parse().unwrap();
        assert_eq!(price.line_total(Quantity::new(3)).unwrap(), Decimal::new(30, 2));
    }

    #[test]
    fn line_total_reports_overflow() {
        let price: UnitPrice = "100000000000000000000".parse().unwrap();
        let err = price.line_total(Quantity::new(u32::MAX)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert!(price.line_total(Quantity::ONE).is_ok());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn quantity_text_encoding_is_lossless(n in any::<u32>()) {
                let parsed: Quantity = n.to_string().parse().unwrap();
                prop_assert_eq!(parsed.get(), n);
            }

            #[test]
            fn decrement_never_goes_below_zero(n in 0u32..1_000, steps in 0usize..2_000) {
                let mut q = Quantity::new(n);
                for _ in 0..steps {
                    q = q.decremented();
                }
                prop_assert_eq!(q.get(), n.saturating_sub(steps as u32));
            }
        }
    }
}
