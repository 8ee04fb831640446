use std::collections::HashMap;
use std::sync::RwLock;

use shopcart_core::{CartLineItem, Entity, ProductId, Quantity};

use super::{CartStore, StoreError};

/// In-memory cart store.
///
/// Intended for tests/dev and for running without on-device persistence.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    items: RwLock<HashMap<ProductId, CartLineItem>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `items` (later duplicates win).
    pub fn with_items(items: impl IntoIterator<Item = CartLineItem>) -> Self {
        let map = items
            .into_iter()
            .map(|item| (item.id().clone(), item))
            .collect();
        Self {
            items: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CartStore for InMemoryCartStore {
    fn fetch_all(&self) -> Result<Vec<CartLineItem>, StoreError> {
        let map = self.items.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.values().cloned().collect())
    }

    fn fetch_by_id(&self, id: &ProductId) -> Result<Option<CartLineItem>, StoreError> {
        let map = self.items.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(id).cloned())
    }

    fn insert(&self, item: CartLineItem) -> Result<(), StoreError> {
        let mut map = self.items.write().map_err(|_| StoreError::Poisoned)?;
        if map.contains_key(item.id()) {
            return Err(StoreError::Duplicate(item.id().clone()));
        }
        map.insert(item.id().clone(), item);
        Ok(())
    }

    fn update_quantity(&self, id: &ProductId, quantity: Quantity) -> Result<(), StoreError> {
        if quantity.is_zero() {
            return Err(StoreError::Rejected(format!("zero quantity for '{id}'")));
        }
        let mut map = self.items.write().map_err(|_| StoreError::Poisoned)?;
        let Some(existing) = map.get_mut(id) else {
            return Err(StoreError::NotFound(id.clone()));
        };
        *existing = existing
            .clone()
            .with_quantity(quantity)
            .map_err(|e| StoreError::Rejected(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, id: &ProductId) -> Result<bool, StoreError> {
        let mut map = self.items.write().map_err(|_| StoreError::Poisoned)?;
        Ok(map.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopcart_core::UnitPrice;

    fn item(id: &str, qty: u32) -> CartLineItem {
        CartLineItem::new(
            ProductId::new(id).unwrap(),
            format!("Product {id}"),
            UnitPrice::new("1.25".parse().unwrap()).unwrap(),
            Quantity::new(qty),
        )
        .unwrap()
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let store = InMemoryCartStore::new();
        store.insert(item("p1", 1)).unwrap();
        let err = store.insert(item("p1", 2)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_of_missing_id_is_not_found() {
        let store = InMemoryCartStore::new();
        let id = ProductId::new("nope").unwrap();
        let err = store.update_quantity(&id, Quantity::new(2)).unwrap_err();
        assert_eq!(err, StoreError::NotFound(id));
    }

    #[test]
    fn update_rejects_zero_and_keeps_record() {
        let store = InMemoryCartStore::with_items([item("p1", 3)]);
        let id = ProductId::new("p1").unwrap();
        let err = store.update_quantity(&id, Quantity::ZERO).unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        assert_eq!(store.fetch_by_id(&id).unwrap().unwrap().quantity(), Quantity::new(3));
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let store = InMemoryCartStore::with_items([item("p1", 1)]);
        let id = ProductId::new("p1").unwrap();
        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.is_empty());
    }
}
