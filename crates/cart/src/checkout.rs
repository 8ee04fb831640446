//! Simulated order completion.

use std::time::Duration;

use rust_decimal::Decimal;
use shopcart_core::{CartLineItem, Entity, ProductId};

use crate::error::CartResult;
use crate::manager::CartStateManager;
use crate::outcome::BulkDeleteReport;
use crate::store::CartStore;
use crate::total::aggregate_cost;

pub const DEFAULT_CHECKOUT_DELAY: Duration = Duration::from_secs(2);

/// Completes an order locally: there is no server side, only a fixed wait.
#[derive(Debug, Clone, Copy)]
pub struct Checkout {
    delay: Duration,
}

/// What was ordered and what was removed from the cart afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub items: Vec<CartLineItem>,
    pub total: Decimal,
    pub report: BulkDeleteReport,
}

impl Default for Checkout {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKOUT_DELAY)
    }
}

impl Checkout {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Snapshot the cart, wait, then delete exactly the snapshotted ids.
    ///
    /// Blocks the calling thread for the delay; no cart lock is held while
    /// waiting, so other screens keep working. Products added during the wait
    /// are not part of the order and stay in the cart. A cart whose total
    /// cannot be summed is refused before the wait and nothing is removed.
    pub fn complete<S>(&self, cart: &CartStateManager<S>) -> CartResult<CheckoutReceipt>
    where
        S: CartStore,
    {
        let items = cart.fetch_all()?;
        let total = aggregate_cost(&items)?;
        tracing::info!(
            items = items.len(),
            %total,
            delay_ms = self.delay.as_millis() as u64,
            "checkout started"
        );

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let ids: Vec<ProductId> = items.iter().map(|item| item.id().clone()).collect();
        let report = cart.delete_many(ids);
        if report.is_complete() {
            tracing::info!(removed = report.deleted.len(), "checkout completed");
        } else {
            tracing::error!(
                failed = report.failed.len(),
                "checkout completed with line items left in cart"
            );
        }

        Ok(CheckoutReceipt { items, total, report })
    }
}
