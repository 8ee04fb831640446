//! Store doubles for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use shopcart_core::{CartLineItem, ProductId, Quantity};

use crate::store::{CartStore, InMemoryCartStore, StoreError};

/// In-memory store whose reads and deletes can be made to fail on demand.
#[derive(Debug, Default)]
pub(crate) struct FlakyStore {
    inner: InMemoryCartStore,
    /// Number of upcoming `fetch_all` calls that fail.
    failing_fetch_all: AtomicU32,
    failing_deletes: Mutex<HashSet<ProductId>>,
}

impl FlakyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_next_fetch_all(&self, times: u32) {
        self.failing_fetch_all.store(times, Ordering::SeqCst);
    }

    pub(crate) fn fail_delete_of(&self, id: &ProductId) {
        self.failing_deletes.lock().unwrap().insert(id.clone());
    }
}

impl CartStore for FlakyStore {
    fn fetch_all(&self) -> Result<Vec<CartLineItem>, StoreError> {
        let remaining = self.failing_fetch_all.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_fetch_all.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::backend("disk unavailable"));
        }
        self.inner.fetch_all()
    }

    fn fetch_by_id(&self, id: &ProductId) -> Result<Option<CartLineItem>, StoreError> {
        self.inner.fetch_by_id(id)
    }

    fn insert(&self, item: CartLineItem) -> Result<(), StoreError> {
        self.inner.insert(item)
    }

    fn update_quantity(&self, id: &ProductId, quantity: Quantity) -> Result<(), StoreError> {
        self.inner.update_quantity(id, quantity)
    }

    fn delete(&self, id: &ProductId) -> Result<bool, StoreError> {
        if self.failing_deletes.lock().unwrap().contains(id) {
            return Err(StoreError::backend(format!("cannot delete {id}")));
        }
        self.inner.delete(id)
    }
}
