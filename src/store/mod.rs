use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::trace;

use crate::scheduler::RemovalQueue;
use crate::types::{Toast, ToastId, ToastUpdate};

mod reducer;

pub use reducer::{TOAST_LIMIT, reduce};

/// Canonical registry state: the toast list (newest first) and the instant
/// the registry was paused at, if any.
#[derive(Clone, Debug, Default)]
pub struct State {
    pub toasts: Vec<Toast>,
    pub paused_at: Option<Instant>,
}

impl State {
    #[must_use]
    pub fn find(&self, id: &ToastId) -> Option<&Toast> {
        self.toasts.iter().find(|t| t.id == *id)
    }
}

/// Typed state transitions accepted by [`ToastStore::dispatch`].
///
/// `Dismiss(None)` and `Remove(None)` target every toast in the registry.
#[derive(Clone, Debug)]
pub enum Action {
    Add(Toast),
    Upsert(Toast),
    Update { id: ToastId, patch: ToastUpdate },
    Dismiss(Option<ToastId>),
    Remove(Option<ToastId>),
    StartPause(Instant),
    EndPause(Instant),
}

type Listener = Arc<dyn Fn(&State) + Send + Sync>;

/// Handle to a subscription, used to unsubscribe.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Listeners {
    entries: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

#[derive(Default)]
struct DispatchQueue {
    queue: VecDeque<Action>,
    draining: bool,
}

struct StoreInner {
    state: Mutex<State>,
    listeners: Mutex<Listeners>,
    pending: Mutex<DispatchQueue>,
    removals: RemovalQueue,
}

/// Dispatch/subscription hub owning one live registry. Cheap to clone; all
/// clones share the same state.
///
/// Most applications use the lazily initialized process-wide instance from
/// [`ToastStore::shared`]; tests construct isolated stores with
/// [`ToastStore::new`].
///
/// Timers (removal grace delays, countdowns) are scheduled on the tokio
/// runtime that is current when they are armed, falling back to the runtime
/// the store was created on. Without any runtime the store still works as a
/// pure state machine, it just never fires timers.
#[derive(Clone)]
pub struct ToastStore {
    inner: Arc<StoreInner>,
}

/// Non-owning reference to a store, held by timer tasks so that a dropped
/// store is not kept alive by its own pending timers.
#[derive(Clone)]
pub struct WeakStore {
    inner: Weak<StoreInner>,
}

impl WeakStore {
    #[must_use]
    pub fn upgrade(&self) -> Option<ToastStore> {
        self.inner.upgrade().map(|inner| ToastStore { inner })
    }
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(State::default()),
                listeners: Mutex::new(Listeners::default()),
                pending: Mutex::new(DispatchQueue::default()),
                removals: RemovalQueue::new(Handle::try_current().ok()),
            }),
        }
    }

    /// The process-wide store, initialized on first use.
    pub fn shared() -> &'static Self {
        static SHARED: OnceLock<ToastStore> = OnceLock::new();
        SHARED.get_or_init(Self::new)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakStore {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> State {
        lock(&self.inner.state).clone()
    }

    /// Run an action through the reducer and synchronously notify every
    /// subscriber with the new state, in registration order.
    ///
    /// Dispatching again from inside a subscriber callback does not recurse:
    /// the nested action is queued and applied once the current broadcast
    /// finishes, so observers always see states in exact dispatch order.
    pub fn dispatch(&self, action: Action) {
        {
            let mut pending = lock(&self.inner.pending);
            pending.queue.push_back(action);
            if pending.draining {
                return;
            }
            pending.draining = true;
        }
        loop {
            let action = {
                let mut pending = lock(&self.inner.pending);
                match pending.queue.pop_front() {
                    Some(action) => action,
                    None => {
                        pending.draining = false;
                        break;
                    }
                }
            };
            self.apply(action);
        }
    }

    /// Register an observer called after every state transition. The callback
    /// runs on whichever thread dispatched the action.
    pub fn subscribe(&self, listener: impl Fn(&State) + Send + Sync + 'static) -> SubscriptionId {
        let mut listeners = lock(&self.inner.listeners);
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    /// Remove an observer. Safe to call from inside a broadcast: the
    /// in-progress broadcast still completes over its snapshot of observers.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        lock(&self.inner.listeners)
            .entries
            .retain(|(entry, _)| *entry != id);
    }

    fn apply(&self, action: Action) {
        let (previous, current) = {
            let mut state = lock(&self.inner.state);
            let next = reducer::reduce(&state, &action);
            let previous = std::mem::replace(&mut *state, next);
            (previous, state.clone())
        };
        trace!(
            action = ?action,
            toasts = current.toasts.len(),
            "state transition applied"
        );
        self.inner
            .removals
            .after_action(&self.downgrade(), &action, &previous);

        let snapshot: Vec<Listener> = lock(&self.inner.listeners)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(&current);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::{Action, ToastStore};
    use crate::types::{Toast, ToastType};
    use std::sync::{Arc, Mutex};

    fn toast(label: &str) -> Toast {
        let mut t = Toast::new(ToastType::Blank, label);
        t.id = label.into();
        t
    }

    #[test]
    fn dispatch_notifies_subscribers_synchronously() {
        let store = ToastStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        store.subscribe(move |state| {
            if let Ok(mut entries) = log.lock() {
                entries.push(state.toasts.len());
            }
        });

        store.dispatch(Action::Add(toast("a")));
        store.dispatch(Action::Add(toast("b")));

        let entries = seen.lock().map(|e| e.clone()).unwrap_or_default();
        assert_eq!(entries, [1, 2]);
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let store = ToastStore::new();
        let count = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&count);
        let id = store.subscribe(move |_| {
            if let Ok(mut n) = counter.lock() {
                *n += 1;
            }
        });

        store.dispatch(Action::Add(toast("a")));
        store.unsubscribe(id);
        store.dispatch(Action::Add(toast("b")));

        assert_eq!(count.lock().map(|n| *n).unwrap_or_default(), 1);
    }

    #[test]
    fn unsubscribing_during_broadcast_keeps_the_snapshot_intact() {
        let store = ToastStore::new();
        let first_hits = Arc::new(Mutex::new(0usize));
        let second_hits = Arc::new(Mutex::new(0usize));

        // The second subscription is registered after the first, and the
        // first removes it mid-broadcast; the snapshot taken for the
        // broadcast must still deliver to it.
        let slot = Arc::new(Mutex::new(None));
        let store_handle = store.clone();
        let removal_slot = Arc::clone(&slot);
        let hits = Arc::clone(&first_hits);
        store.subscribe(move |_| {
            if let Ok(mut n) = hits.lock() {
                *n += 1;
            }
            if let Ok(mut target) = removal_slot.lock() {
                if let Some(id) = target.take() {
                    store_handle.unsubscribe(id);
                }
            }
        });
        let hits = Arc::clone(&second_hits);
        let second = store.subscribe(move |_| {
            if let Ok(mut n) = hits.lock() {
                *n += 1;
            }
        });
        if let Ok(mut target) = slot.lock() {
            *target = Some(second);
        }

        store.dispatch(Action::Add(toast("a")));
        assert_eq!(second_hits.lock().map(|n| *n).unwrap_or_default(), 1);

        store.dispatch(Action::Add(toast("b")));
        assert_eq!(first_hits.lock().map(|n| *n).unwrap_or_default(), 2);
        assert_eq!(second_hits.lock().map(|n| *n).unwrap_or_default(), 1);
    }

    #[test]
    fn nested_dispatch_is_queued_not_recursed() {
        let store = ToastStore::new();
        let observed = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&observed);
        let nested = store.clone();
        store.subscribe(move |state| {
            if let Ok(mut entries) = log.lock() {
                entries.push(state.toasts.len());
            }
            if state.toasts.len() == 1 {
                nested.dispatch(Action::Add(toast("nested")));
            }
        });

        store.dispatch(Action::Add(toast("outer")));

        // The nested action must be applied after the first broadcast
        // completes, never interleaved inside it.
        let entries = observed.lock().map(|e| e.clone()).unwrap_or_default();
        assert_eq!(entries, [1, 2]);
    }

    #[test]
    fn stores_are_isolated() {
        let a = ToastStore::new();
        let b = ToastStore::new();
        a.dispatch(Action::Add(toast("only-in-a")));
        assert_eq!(a.state().toasts.len(), 1);
        assert!(b.state().toasts.is_empty());
    }

    #[test]
    fn shared_store_is_a_singleton() {
        assert!(std::ptr::eq(ToastStore::shared(), ToastStore::shared()));
    }
}
