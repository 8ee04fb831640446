//! `shopcart-core` — cart domain building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no IO).

pub mod entity;
pub mod error;
pub mod id;
pub mod line_item;
pub mod price;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::ProductId;
pub use line_item::{CartLineItem, ProductCandidate};
pub use price::format_price;
pub use value_object::{Quantity, UnitPrice, ValueObject};
