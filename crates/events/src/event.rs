use chrono::{DateTime, Utc};
use serde::Serialize;

use shopcart_core::{ProductId, Quantity};

/// A domain event.
///
/// Events are immutable: treat them as facts.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "cart.item.added").
    fn event_type(&self) -> &'static str;

    /// When the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Fact describing a single accepted cart mutation.
///
/// Screens use these to react to a specific change (e.g. re-index the cart
/// list after a row disappeared) without diffing snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded {
        product_id: ProductId,
        quantity: Quantity,
        occurred_at: DateTime<Utc>,
    },
    QuantityChanged {
        product_id: ProductId,
        from: Quantity,
        to: Quantity,
        occurred_at: DateTime<Utc>,
    },
    ItemRemoved {
        product_id: ProductId,
        occurred_at: DateTime<Utc>,
    },
    /// A bulk delete finished (checkout, "empty cart").
    Cleared {
        removed: Vec<ProductId>,
        occurred_at: DateTime<Utc>,
    },
}

impl CartEvent {
    /// The product this event is about, if it concerns a single one.
    pub fn product_id(&self) -> Option<&ProductId> {
        match self {
            CartEvent::ItemAdded { product_id, .. }
            | CartEvent::QuantityChanged { product_id, .. }
            | CartEvent::ItemRemoved { product_id, .. } => Some(product_id),
            CartEvent::Cleared { .. } => None,
        }
    }
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded { .. } => "cart.item.added",
            CartEvent::QuantityChanged { .. } => "cart.item.quantity_changed",
            CartEvent::ItemRemoved { .. } => "cart.item.removed",
            CartEvent::Cleared { .. } => "cart.cleared",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::ItemAdded { occurred_at, .. }
            | CartEvent::QuantityChanged { occurred_at, .. }
            | CartEvent::ItemRemoved { occurred_at, .. }
            | CartEvent::Cleared { occurred_at, .. } => *occurred_at,
        }
    }
}
