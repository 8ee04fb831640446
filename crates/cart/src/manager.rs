//! The cart state manager.
//!
//! Single mediator between screens and the [`CartStore`]. Every mutation:
//!
//! 1. takes the mutation lock (one write in flight at a time),
//! 2. applies the change to the store,
//! 3. publishes a typed [`CartEvent`],
//! 4. re-reads the whole store and republishes the snapshot and total.
//!
//! Snapshots are never patched in memory, so anything a subscriber sees is
//! what the store holds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use shopcart_core::{CartLineItem, DomainResult, Entity, ProductCandidate, ProductId, Quantity};
use shopcart_events::{
    CartEvent, Event, EventBus, EventEnvelope, InMemoryEventBus, Observable, Subscription,
};

use crate::error::CartResult;
use crate::outcome::{AddOutcome, BulkDeleteReport, UpdateOutcome};
use crate::store::{CartStore, StoreError};
use crate::total::CartTotal;

/// Reads attempted when recomputing after a mutation before the total is
/// flagged stale.
const RECOMPUTE_ATTEMPTS: u32 = 2;

/// Authoritative owner of the cart.
///
/// Construct one at application start and share it (`Arc`) with every screen.
///
/// Inline subscribers of [`items`](Self::items) and [`total`](Self::total)
/// are called while the mutation lock is held: they may query the cart but
/// must not mutate it. Subscribers that need to mutate should use
/// `subscribe_on` with the UI queue.
pub struct CartStateManager<S> {
    store: S,
    mutation: Mutex<()>,
    items: Observable<Vec<CartLineItem>>,
    total: Observable<CartTotal>,
    events: InMemoryEventBus<EventEnvelope<CartEvent>>,
    sequence: AtomicU64,
}

impl<S> core::fmt::Debug for CartStateManager<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CartStateManager")
            .field("total", &self.total.get())
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<S> CartStateManager<S>
where
    S: CartStore,
{
    /// Wrap `store` and publish its current content.
    ///
    /// If the initial read fails the published total is flagged stale; call
    /// [`refresh`](Self::refresh) later to retry.
    pub fn new(store: S) -> Self {
        let manager = Self {
            store,
            mutation: Mutex::new(()),
            items: Observable::new(Vec::new()),
            total: Observable::new(CartTotal::default()),
            events: InMemoryEventBus::new(),
            sequence: AtomicU64::new(0),
        };
        {
            let _guard = manager.lock();
            manager.republish();
        }
        manager
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Whether a line item exists for `id`. Store failures are returned, never
    /// turned into `false`.
    pub fn is_in_cart(&self, id: &ProductId) -> CartResult<bool> {
        Ok(self.store.fetch_by_id(id)?.is_some())
    }

    /// Current quantity of `id`, or `None` when it is not in the cart.
    pub fn quantity(&self, id: &ProductId) -> CartResult<Option<Quantity>> {
        Ok(self.store.fetch_by_id(id)?.map(|item| item.quantity()))
    }

    pub fn line_item(&self, id: &ProductId) -> CartResult<Option<CartLineItem>> {
        Ok(self.store.fetch_by_id(id)?)
    }

    /// Every stored line item, in no particular order.
    pub fn fetch_all(&self) -> CartResult<Vec<CartLineItem>> {
        Ok(self.store.fetch_all()?)
    }

    // ---------------------------------------------------------------------
    // Subscriptions
    // ---------------------------------------------------------------------

    /// Latest snapshot of the cart, republished after every mutation.
    pub fn items(&self) -> &Observable<Vec<CartLineItem>> {
        &self.items
    }

    /// Latest aggregate cost, republished after every mutation.
    pub fn total(&self) -> &Observable<CartTotal> {
        &self.total
    }

    /// Stream of typed events, one per accepted mutation.
    pub fn subscribe_events(&self) -> Subscription<EventEnvelope<CartEvent>> {
        self.events.subscribe()
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Put a product in the cart.
    ///
    /// Stores the candidate's quantity (one unit when it carries none). If the
    /// product is already in the cart nothing changes and the stored quantity
    /// is reported back. A line whose total would overflow is rejected before
    /// anything is written.
    pub fn add(&self, candidate: ProductCandidate) -> CartResult<AddOutcome> {
        let _guard = self.lock();

        if let Some(existing) = self.store.fetch_by_id(candidate.id())? {
            tracing::debug!(product_id = %existing.id(), "add ignored: product already in cart");
            return Ok(AddOutcome::AlreadyInCart(existing.quantity()));
        }

        let item = candidate.into_line_item();
        item.line_total()?;
        let id = item.id().clone();
        let quantity = item.quantity();

        match self.store.insert(item) {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                let stored = self
                    .store
                    .fetch_by_id(&id)?
                    .map_or(quantity, |existing| existing.quantity());
                tracing::warn!(
                    product_id = %id,
                    "add raced with another writer; keeping stored item"
                );
                return Ok(AddOutcome::AlreadyInCart(stored));
            }
            Err(err) => return Err(err.into()),
        }

        tracing::debug!(product_id = %id, %quantity, "line item added");
        self.after_mutation(CartEvent::ItemAdded {
            product_id: id,
            quantity,
            occurred_at: Utc::now(),
        });
        Ok(AddOutcome::Added(quantity))
    }

    /// Set the quantity of a product already in the cart. Zero removes it.
    ///
    /// A missing product is not an error: it is logged and reported as
    /// [`UpdateOutcome::NotFound`].
    pub fn update_quantity(&self, id: &ProductId, quantity: Quantity) -> CartResult<UpdateOutcome> {
        self.change_quantity(id, |_| Ok(quantity))
    }

    /// One more unit of `id`.
    pub fn increment(&self, id: &ProductId) -> CartResult<UpdateOutcome> {
        self.change_quantity(id, Quantity::incremented)
    }

    /// One unit less of `id`; at one unit this removes the line item.
    pub fn decrement(&self, id: &ProductId) -> CartResult<UpdateOutcome> {
        self.change_quantity(id, |current| Ok(current.decremented()))
    }

    /// Remove `id` from the cart. Removing an absent product succeeds.
    pub fn delete(&self, id: &ProductId) -> CartResult<()> {
        let _guard = self.lock();

        if self.store.delete(id)? {
            tracing::debug!(product_id = %id, "line item deleted");
            self.after_mutation(CartEvent::ItemRemoved {
                product_id: id.clone(),
                occurred_at: Utc::now(),
            });
        } else {
            tracing::debug!(product_id = %id, "delete ignored: product not in cart");
        }
        Ok(())
    }

    /// Remove every id in `ids`, continuing past individual failures, then
    /// recompute once.
    pub fn delete_many<I>(&self, ids: I) -> BulkDeleteReport
    where
        I: IntoIterator<Item = ProductId>,
    {
        let _guard = self.lock();
        self.delete_many_locked(ids)
    }

    /// Empty the cart.
    pub fn clear(&self) -> CartResult<BulkDeleteReport> {
        let _guard = self.lock();
        let ids: Vec<ProductId> = self
            .store
            .fetch_all()?
            .into_iter()
            .map(|item| item.id().clone())
            .collect();
        Ok(self.delete_many_locked(ids))
    }

    /// Re-read the store and republish snapshot and total.
    ///
    /// Returns `false` when the store could not be read or its line items
    /// cannot be summed; the total is then flagged stale.
    pub fn refresh(&self) -> bool {
        let _guard = self.lock();
        self.republish()
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, ()> {
        // Guards no data, so a poisoned lock is still usable.
        self.mutation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn change_quantity<F>(&self, id: &ProductId, next: F) -> CartResult<UpdateOutcome>
    where
        F: FnOnce(Quantity) -> DomainResult<Quantity>,
    {
        let _guard = self.lock();

        let Some(current) = self.store.fetch_by_id(id)? else {
            tracing::warn!(product_id = %id, "quantity change ignored: product not in cart");
            return Ok(UpdateOutcome::NotFound);
        };

        let from = current.quantity();
        let to = next(from)?;

        if to.is_zero() {
            self.store.delete(id)?;
            tracing::debug!(product_id = %id, "quantity reached zero; line item deleted");
            self.after_mutation(CartEvent::ItemRemoved {
                product_id: id.clone(),
                occurred_at: Utc::now(),
            });
            return Ok(UpdateOutcome::Removed);
        }

        current.unit_price().line_total(to)?;

        match self.store.update_quantity(id, to) {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => {
                tracing::warn!(
                    product_id = %id,
                    "quantity change ignored: product vanished from store"
                );
                return Ok(UpdateOutcome::NotFound);
            }
            Err(err) => return Err(err.into()),
        }

        tracing::debug!(product_id = %id, %from, %to, "quantity changed");
        self.after_mutation(CartEvent::QuantityChanged {
            product_id: id.clone(),
            from,
            to,
            occurred_at: Utc::now(),
        });
        Ok(UpdateOutcome::Updated { from, to })
    }

    fn delete_many_locked<I>(&self, ids: I) -> BulkDeleteReport
    where
        I: IntoIterator<Item = ProductId>,
    {
        let mut report = BulkDeleteReport::default();

        for id in ids {
            match self.store.delete(&id) {
                Ok(true) => report.deleted.push(id),
                Ok(false) => report.missing.push(id),
                Err(err) => {
                    tracing::error!(
                        product_id = %id,
                        error = %err,
                        "bulk delete: line item not removed"
                    );
                    report.failed.push((id, err));
                }
            }
        }

        tracing::debug!(
            deleted = report.deleted.len(),
            missing = report.missing.len(),
            failed = report.failed.len(),
            "bulk delete finished"
        );

        if !report.deleted.is_empty() {
            self.publish_event(CartEvent::Cleared {
                removed: report.deleted.clone(),
                occurred_at: Utc::now(),
            });
        }
        self.republish();
        report
    }

    fn after_mutation(&self, event: CartEvent) {
        self.publish_event(event);
        self.republish();
    }

    fn publish_event(&self, event: CartEvent) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(
            sequence,
            event_type = event.event_type(),
            occurred_at = %event.occurred_at(),
            "cart event"
        );
        if let Err(err) = self.events.publish(EventEnvelope::new(sequence, event)) {
            tracing::error!(sequence, error = ?err, "failed to publish cart event");
        }
    }

    /// Derive snapshot and total from a fresh store read and publish them.
    fn republish(&self) -> bool {
        let mut last_error = None;

        for attempt in 1..=RECOMPUTE_ATTEMPTS {
            match self.store.fetch_all() {
                Ok(items) => return self.publish_snapshot(items),
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "cart recomputation read failed");
                    last_error = Some(err);
                }
            }
        }

        tracing::error!(
            error = ?last_error,
            "cart total is stale: store could not be re-read"
        );
        self.total.set(self.total.get().into_stale());
        false
    }

    fn publish_snapshot(&self, items: Vec<CartLineItem>) -> bool {
        match CartTotal::from_items(&items) {
            Ok(total) => {
                tracing::debug!(items = items.len(), amount = %total.amount, "cart republished");
                self.items.set(items);
                self.total.set(total);
                true
            }
            Err(err) => {
                tracing::error!(
                    items = items.len(),
                    error = %err,
                    "cart total is stale: stored line items cannot be summed"
                );
                self.items.set(items);
                self.total.set(self.total.get().into_stale());
                false
            }
        }
    }
}
