//! Cart manager error model.

use thiserror::Error;

use shopcart_core::DomainError;

use crate::store::StoreError;

pub type CartResult<T> = Result<T, CartError>;

/// Failure surfaced by [`CartStateManager`](crate::CartStateManager)
/// operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Reading or writing persisted line items failed.
    #[error("cart store failure: {0}")]
    Store(#[from] StoreError),

    /// The requested change breaks a domain rule (e.g. quantity overflow).
    #[error(transparent)]
    Domain(#[from] DomainError),
}
