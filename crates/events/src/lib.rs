//! Change propagation for cart state.
//!
//! Two mechanisms live here:
//! - [`Observable`]: a single current value (cart snapshot, cart total) that
//!   any number of subscribers can watch.
//! - [`EventBus`]: a stream of typed [`CartEvent`]s describing *what* changed.

pub mod bus;
pub mod delivery;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;
pub mod observable;

pub use bus::{EventBus, Subscription};
pub use delivery::{UiExecutor, UiQueue, ui_context};
pub use envelope::EventEnvelope;
pub use event::{CartEvent, Event};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use observable::{Observable, SubscriptionHandle};
