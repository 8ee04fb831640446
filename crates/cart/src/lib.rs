//! `shopcart-cart` — the cart state manager.
//!
//! **Responsibility:** keep the published cart (line items + total) consistent
//! with the persisted records while several screens read and mutate it.
//!
//! ```text
//! screen → CartStateManager → CartStore (write) → CartStore (re-read)
//!                                   ↓
//!                   Observable<Vec<CartLineItem>> + Observable<CartTotal>
//!                   EventBus<CartEvent>
//! ```

pub mod checkout;
pub mod error;
pub mod manager;
pub mod outcome;
pub mod store;
pub mod total;

#[cfg(test)]
pub(crate) mod testing;

pub use checkout::{Checkout, CheckoutReceipt, DEFAULT_CHECKOUT_DELAY};
pub use error::{CartError, CartResult};
pub use manager::CartStateManager;
pub use outcome::{AddOutcome, BulkDeleteReport, UpdateOutcome};
pub use store::{CartStore, InMemoryCartStore, StoreError};
pub use total::{CartTotal, aggregate_cost, total_units};
