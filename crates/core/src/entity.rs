//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Cart line items and product candidates are both keyed by their product
/// identifier; stores and the cart manager look records up through this.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
