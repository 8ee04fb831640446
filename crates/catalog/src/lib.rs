//! Products offered by the remote API.
//!
//! Fetches the vertical product list and the suggested (horizontal) list and
//! maps them to [`ProductCandidate`](shopcart_core::ProductCandidate)s that
//! screens can add to the cart.

pub mod catalog;
pub mod dto;
pub mod error;
pub mod mapping;
pub mod source;

pub use catalog::{Catalog, CatalogList};
pub use error::CatalogError;
pub use source::{HttpProductSource, ProductSource};
