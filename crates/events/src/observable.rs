//! Observable value channel.
//!
//! An [`Observable`] holds one current value and notifies subscribers every
//! time it is replaced. Subscribers choose where they are called:
//!
//! - [`Observable::subscribe`]: inline, on the publishing thread
//! - [`Observable::subscribe_on`]: queued on a [`UiQueue`], run by the UI thread
//! - [`Observable::watch`]: a channel [`Subscription`] drained by the consumer
//!
//! Every new subscriber immediately receives the current value, so a screen
//! that appears after the last change still renders the right state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::bus::Subscription;
use crate::delivery::UiQueue;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

enum Sink<T> {
    Inline(Callback<T>),
    Queued(UiQueue, Callback<T>),
    Channel(mpsc::Sender<T>),
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        match self {
            Sink::Inline(cb) => Sink::Inline(cb.clone()),
            Sink::Queued(queue, cb) => Sink::Queued(queue.clone(), cb.clone()),
            Sink::Channel(tx) => Sink::Channel(tx.clone()),
        }
    }
}

impl<T> Sink<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Deliver a value. Returns `false` if the receiving side is gone.
    fn deliver(&self, value: &T) -> bool {
        match self {
            Sink::Inline(cb) => {
                cb(value);
                true
            }
            Sink::Queued(queue, cb) => {
                let cb = cb.clone();
                let value = value.clone();
                queue.post(move || cb(&value))
            }
            Sink::Channel(tx) => tx.send(value.clone()).is_ok(),
        }
    }
}

struct Slot<T> {
    id: u64,
    sink: Sink<T>,
}

struct Shared<T> {
    value: Mutex<T>,
    slots: Mutex<Vec<Slot<T>>>,
    /// Held for a whole fan-out or replay; lock order is delivery, value, slots.
    delivery: Mutex<()>,
    next_id: AtomicU64,
}

impl<T> Shared<T> {
    fn delivery(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn value(&self) -> MutexGuard<'_, T> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slots(&self) -> MutexGuard<'_, Vec<Slot<T>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) {
        self.slots().retain(|slot| slot.id != id);
    }
}

/// Multi-subscriber holder of a current value.
///
/// Cloning an `Observable` yields another handle to the same value.
///
/// Deliveries are serialized: a value set while a new subscriber is receiving
/// its replay reaches that subscriber after the replay, never before. Inline
/// callbacks may read the observable but must not call
/// [`Observable::set`] or subscribe on the same instance, which would
/// deadlock.
pub struct Observable<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> core::fmt::Debug for Observable<T>
where
    T: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.shared.value())
            .field("subscribers", &self.shared.slots().len())
            .finish()
    }
}

impl<T> Default for Observable<T>
where
    T: Default + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                value: Mutex::new(value),
                slots: Mutex::new(Vec::new()),
                delivery: Mutex::new(()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Current value (cloned).
    pub fn get(&self) -> T {
        self.shared.value().clone()
    }

    /// Replace the value and notify every subscriber.
    pub fn set(&self, value: T) {
        let _delivery = self.shared.delivery();
        let sinks: Vec<(u64, Sink<T>)> = {
            let mut current = self.shared.value();
            *current = value.clone();
            self.shared
                .slots()
                .iter()
                .map(|slot| (slot.id, slot.sink.clone()))
                .collect()
        };

        let mut dead = Vec::new();
        for (id, sink) in sinks {
            if !sink.deliver(&value) {
                dead.push(id);
            }
        }

        if !dead.is_empty() {
            tracing::debug!(count = dead.len(), "pruning disconnected observers");
            self.shared.slots().retain(|slot| !dead.contains(&slot.id));
        }
    }

    /// Call `f` inline on every change, starting with the current value.
    pub fn subscribe<F>(&self, f: F) -> SubscriptionHandle
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.register(Sink::Inline(Arc::new(f)))
    }

    /// Call `f` on the UI thread (via `queue`) on every change, starting with
    /// the current value.
    pub fn subscribe_on<F>(&self, queue: &UiQueue, f: F) -> SubscriptionHandle
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.register(Sink::Queued(queue.clone(), Arc::new(f)))
    }

    /// Receive every change through a channel, starting with the current
    /// value. Dropping the subscription unsubscribes.
    pub fn watch(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::channel();
        // The channel sink is pruned on the next `set` once `rx` is dropped.
        self.register(Sink::Channel(tx)).detach();
        Subscription::new(rx)
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.slots().len()
    }

    fn register(&self, sink: Sink<T>) -> SubscriptionHandle {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);

        let _delivery = self.shared.delivery();
        let replay = {
            let current = self.shared.value();
            self.shared.slots().push(Slot {
                id,
                sink: sink.clone(),
            });
            current.clone()
        };

        if !sink.deliver(&replay) {
            self.shared.remove(id);
        }

        let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        SubscriptionHandle {
            unsubscribe: Some(Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.remove(id);
                }
            })),
        }
    }
}

/// Keeps a callback subscription alive.
///
/// Dropping the handle (or calling [`SubscriptionHandle::unsubscribe`])
/// removes the callback. Handles are type-erased so a screen can keep the
/// handles for several observables in one `Vec`.
#[must_use = "dropping the handle unsubscribes immediately"]
pub struct SubscriptionHandle {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl SubscriptionHandle {
    /// Remove the subscription now.
    pub fn unsubscribe(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }

    /// Keep the subscription for the lifetime of the observable.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl core::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::ui_context;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;

    fn recorder<T: Clone + Send + 'static>()
    -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |v: &T| sink.lock().unwrap().push(v.clone()))
    }

    #[test]
    fn subscribers_get_current_value_then_changes() {
        let obs = Observable::new(1);
        let (seen, f) = recorder();
        let _handle = obs.subscribe(f);

        obs.set(2);
        obs.set(3);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(obs.get(), 3);
    }

    #[test]
    fn multiple_subscribers_are_all_notified() {
        let obs = Observable::new(String::new());
        let (a, fa) = recorder();
        let (b, fb) = recorder();
        let _ha = obs.subscribe(fa);
        let _hb = obs.subscribe(fb);

        obs.set("x".to_string());

        assert_eq!(*a.lock().unwrap(), vec![String::new(), "x".to_string()]);
        assert_eq!(*b.lock().unwrap(), vec![String::new(), "x".to_string()]);
    }

    #[test]
    fn dropping_the_handle_unsubscribes() {
        let obs = Observable::new(0);
        let (seen, f) = recorder();
        let handle = obs.subscribe(f);
        assert_eq!(obs.subscriber_count(), 1);

        drop(handle);
        obs.set(5);

        assert_eq!(obs.subscriber_count(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn explicit_unsubscribe_stops_delivery() {
        let obs = Observable::new(0);
        let (seen, f) = recorder();
        obs.subscribe(f).unsubscribe();
        obs.set(9);
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn detached_subscription_outlives_handle() {
        let obs = Observable::new(0);
        let (seen, f) = recorder();
        obs.subscribe(f).detach();
        obs.set(1);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn queued_subscribers_run_on_ui_thread_only() {
        let (queue, executor) = ui_context();
        let obs = Observable::new(0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _handle = obs.subscribe_on(&queue, move |v: &i32| {
            sink.lock().unwrap().push((*v, thread::current().id()));
        });

        let publisher = obs.clone();
        thread::spawn(move || publisher.set(42)).join().unwrap();

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(executor.run_pending(), 2);

        let ui = thread::current().id();
        assert_eq!(*seen.lock().unwrap(), vec![(0, ui), (42, ui)]);
    }

    #[test]
    fn watch_replays_and_streams() {
        let obs = Observable::new(10);
        let sub = obs.watch();
        obs.set(11);
        assert_eq!(sub.drain(), vec![10, 11]);
    }

    #[test]
    fn dropped_watchers_are_pruned() {
        let obs = Observable::new(0);
        drop(obs.watch());
        assert_eq!(obs.subscriber_count(), 1);
        obs.set(1);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn replay_never_overwrites_a_concurrent_set() {
        let obs = Observable::new(0);
        let last = Arc::new(Mutex::new(None));
        let first_call = Arc::new(AtomicBool::new(true));
        let (replaying_tx, replaying_rx) = mpsc::channel::<()>();

        let publisher = obs.clone();
        let setter = thread::spawn(move || {
            replaying_rx.recv().unwrap();
            publisher.set(1);
        });

        let sink = last.clone();
        let replaying_tx = Mutex::new(replaying_tx);
        let _handle = obs.subscribe(move |v: &i32| {
            if first_call.swap(false, Ordering::SeqCst) {
                replaying_tx.lock().unwrap().send(()).unwrap();
                thread::sleep(Duration::from_millis(100));
            }
            *sink.lock().unwrap() = Some(*v);
        });
        setter.join().unwrap();

        assert_eq!(obs.get(), 1);
        assert_eq!(*last.lock().unwrap(), Some(1));
    }

    #[test]
    fn callbacks_may_read_the_observable() {
        let obs = Observable::new(0);
        let reader = obs.clone();
        let (seen, f) = recorder();
        let _handle = obs.subscribe(move |_: &i32| f(&reader.get()));
        obs.set(3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 3]);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn subscribers_end_on_the_current_value(
                values in proptest::collection::vec(any::<i32>(), 1..30),
                join_at in 0usize..30,
            ) {
                let obs = Observable::new(0);
                let early = obs.watch();
                let (seen, f) = recorder::<i32>();
                let mut f = Some(f);
                let mut late = None;

                for (n, value) in values.iter().enumerate() {
                    if n == join_at {
                        late = f.take().map(|f| obs.subscribe(f));
                    }
                    obs.set(*value);
                }

                let mut expected = vec![0];
                expected.extend(values.iter().copied());
                prop_assert_eq!(early.drain(), expected);

                match late {
                    Some(_handle) => {
                        let seen = seen.lock().unwrap();
                        let replayed = if join_at == 0 { 0 } else { values[join_at - 1] };
                        prop_assert_eq!(seen.first().copied(), Some(replayed));
                        prop_assert_eq!(&seen[1..], &values[join_at..]);
                        prop_assert_eq!(seen.last().copied(), Some(obs.get()));
                    }
                    None => prop_assert!(seen.lock().unwrap().is_empty()),
                }
            }
        }
    }
}
