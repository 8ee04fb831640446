//! Typed results of cart mutations.

use shopcart_core::{ProductId, Quantity};

use crate::store::StoreError;

/// Result of [`CartStateManager::add`](crate::CartStateManager::add).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line item was stored with this quantity.
    Added(Quantity),
    /// The product was already in the cart; nothing changed.
    AlreadyInCart(Quantity),
}

impl AddOutcome {
    pub fn quantity(self) -> Quantity {
        match self {
            AddOutcome::Added(q) | AddOutcome::AlreadyInCart(q) => q,
        }
    }
}

/// Result of a quantity change (set, increment, decrement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated { from: Quantity, to: Quantity },
    /// The quantity reached zero and the line item was deleted.
    Removed,
    /// No line item with that id; nothing changed.
    NotFound,
}

impl UpdateOutcome {
    /// Quantity in the cart after the change (`None` when absent).
    pub fn quantity(self) -> Option<Quantity> {
        match self {
            UpdateOutcome::Updated { to, .. } => Some(to),
            UpdateOutcome::Removed | UpdateOutcome::NotFound => None,
        }
    }
}

/// Per-id result of a bulk delete.
///
/// A failing id never stops the remaining deletes; callers inspect `failed`
/// to decide whether to retry or warn the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteReport {
    pub deleted: Vec<ProductId>,
    pub missing: Vec<ProductId>,
    pub failed: Vec<(ProductId, StoreError)>,
}

impl BulkDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> impl Iterator<Item = &ProductId> {
        self.failed.iter().map(|(id, _)| id)
    }
}
