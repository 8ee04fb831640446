//! Aggregate cost computation.

use rust_decimal::Decimal;
use serde::Serialize;

use shopcart_core::{CartLineItem, DomainError, DomainResult, format_price};

/// Σ `unit price × quantity` over `items`, exact (no rounding).
///
/// Fails instead of panicking when a line total or the sum does not fit in a
/// `Decimal`.
pub fn aggregate_cost(items: &[CartLineItem]) -> DomainResult<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        acc.checked_add(item.line_total()?)
            .ok_or_else(|| DomainError::invariant("cart total overflows"))
    })
}

/// Total number of units across `items`.
pub fn total_units(items: &[CartLineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity().get())).sum()
}

/// Published aggregate cost of the cart.
///
/// `stale` is set when the last recomputation could not read the store or
/// could not sum it; the amount is then the last value that was computed
/// successfully and screens should flag it as possibly out of date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CartTotal {
    pub amount: Decimal,
    pub units: u64,
    pub stale: bool,
}

impl CartTotal {
    pub fn from_items(items: &[CartLineItem]) -> DomainResult<Self> {
        Ok(Self {
            amount: aggregate_cost(items)?,
            units: total_units(items),
            stale: false,
        })
    }

    /// The same total flagged as out of date.
    pub fn into_stale(self) -> Self {
        Self { stale: true, ..self }
    }

    pub fn is_empty(&self) -> bool {
        self.units == 0
    }

    /// Presentation text (`₺35,00`); rounding happens here only.
    pub fn display(&self) -> String {
        format_price(self.amount)
    }
}
