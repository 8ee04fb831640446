//! Persisted record store abstraction.
//!
//! The store is the source of truth for the cart. The manager never keeps an
//! authoritative copy of its own; every published snapshot is a fresh read.

mod in_memory;

pub use in_memory::InMemoryCartStore;

use std::sync::Arc;

use thiserror::Error;

use shopcart_core::{CartLineItem, ProductId, Quantity};

/// Store operation error.
///
/// These are **storage errors** (IO, corrupt records, key conflicts) as
/// opposed to domain errors (validation, invariants).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend failed (IO, connection, query).
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// A persisted record could not be decoded into a line item.
    #[error("corrupt record '{id}': {reason}")]
    Corrupt { id: String, reason: String },

    /// An insert targeted an id that is already stored.
    #[error("line item '{0}' is already stored")]
    Duplicate(ProductId),

    /// An update targeted an id that is not stored.
    #[error("line item '{0}' is not stored")]
    NotFound(ProductId),

    /// The write would break a record invariant (e.g. zero quantity).
    #[error("rejected write: {0}")]
    Rejected(String),

    /// Internal lock poisoning (in-process stores).
    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn corrupt(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Durable storage of cart line items, keyed by product id.
///
/// Implementations must keep ids unique (`insert` of a stored id is
/// [`StoreError::Duplicate`]) and must never hold a zero quantity.
/// `fetch_all` makes no ordering promise.
pub trait CartStore: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<CartLineItem>, StoreError>;

    fn fetch_by_id(&self, id: &ProductId) -> Result<Option<CartLineItem>, StoreError>;

    fn insert(&self, item: CartLineItem) -> Result<(), StoreError>;

    /// Overwrite the quantity of a stored item.
    ///
    /// Fails with [`StoreError::NotFound`] if the id is absent and with
    /// [`StoreError::Rejected`] for a zero quantity.
    fn update_quantity(&self, id: &ProductId, quantity: Quantity) -> Result<(), StoreError>;

    /// Remove an item. Returns whether something was removed.
    fn delete(&self, id: &ProductId) -> Result<bool, StoreError>;
}

impl<S> CartStore for Arc<S>
where
    S: CartStore + ?Sized,
{
    fn fetch_all(&self) -> Result<Vec<CartLineItem>, StoreError> {
        (**self).fetch_all()
    }

    fn fetch_by_id(&self, id: &ProductId) -> Result<Option<CartLineItem>, StoreError> {
        (**self).fetch_by_id(id)
    }

    fn insert(&self, item: CartLineItem) -> Result<(), StoreError> {
        (**self).insert(item)
    }

    fn update_quantity(&self, id: &ProductId, quantity: Quantity) -> Result<(), StoreError> {
        (**self).update_quantity(id, quantity)
    }

    fn delete(&self, id: &ProductId) -> Result<bool, StoreError> {
        (**self).delete(id)
    }
}

impl<S> CartStore for Box<S>
where
    S: CartStore + ?Sized,
{
    fn fetch_all(&self) -> Result<Vec<CartLineItem>, StoreError> {
        (**self).fetch_all()
    }

    fn fetch_by_id(&self, id: &ProductId) -> Result<Option<CartLineItem>, StoreError> {
        (**self).fetch_by_id(id)
    }

    fn insert(&self, item: CartLineItem) -> Result<(), StoreError> {
        (**self).insert(item)
    }

    fn update_quantity(&self, id: &ProductId, quantity: Quantity) -> Result<(), StoreError> {
        (**self).update_quantity(id, quantity)
    }

    fn delete(&self, id: &ProductId) -> Result<bool, StoreError> {
        (**self).delete(id)
    }
}
