//! Timer wiring for the registry. Two independent mechanisms:
//!
//! - [`RemovalQueue`]: a fixed grace delay between a toast turning invisible
//!   and its removal from the registry, leaving room for exit animations.
//!   Owned by the store and driven by dispatched actions.
//! - [`CountdownScheduler`]: one-shot auto-dismiss timers derived from each
//!   toast's resolved duration. Owned by a consumer-side
//!   [`crate::toaster::Toaster`] and rebuilt from scratch on every observed
//!   state change.
//!
//! Timer callbacks never mutate state directly; they dispatch actions through
//! the store like everybody else, holding only a weak store reference.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::debug;

use crate::options::DefaultToastOptions;
use crate::store::{Action, State, WeakStore};
use crate::types::ToastId;

/// Grace delay between `visible` flipping false and the toast leaving the
/// registry.
pub const REMOVE_DELAY: Duration = Duration::from_millis(1000);

/// Pending delayed-removal timers, at most one per toast id.
pub(crate) struct RemovalQueue {
    handle: Option<Handle>,
    pending: Mutex<HashMap<ToastId, JoinHandle<()>>>,
}

impl RemovalQueue {
    pub(crate) fn new(handle: Option<Handle>) -> Self {
        Self {
            handle,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Runtime to spawn timers on: whichever is current at arm time, falling
    /// back to the one captured at construction. A store built outside a
    /// runtime and later driven from inside one must still run its timers.
    fn runtime(&self) -> Option<Handle> {
        Handle::try_current().ok().or_else(|| self.handle.clone())
    }

    /// React to a freshly applied action. Dismissals arm removal timers;
    /// updates cancel them (an update means the toast is still alive, even if
    /// it was about to be purged); removals retire them.
    pub(crate) fn after_action(&self, store: &WeakStore, action: &Action, previous: &State) {
        match action {
            Action::Dismiss(Some(id)) => self.arm(store, id.clone()),
            Action::Dismiss(None) => {
                for toast in &previous.toasts {
                    self.arm(store, toast.id.clone());
                }
            }
            Action::Update { id, .. } => self.cancel(id),
            Action::Upsert(toast) if previous.find(&toast.id).is_some() => self.cancel(&toast.id),
            Action::Remove(Some(id)) => self.cancel(id),
            Action::Remove(None) => self.cancel_all(),
            Action::Add(_) | Action::Upsert(_) | Action::StartPause(_) | Action::EndPause(_) => {}
        }
    }

    fn arm(&self, store: &WeakStore, id: ToastId) {
        let Some(handle) = self.runtime() else {
            debug!(toast_id = %id, "no runtime available, skipping removal timer");
            return;
        };
        let mut pending = lock(&self.pending);
        if pending.contains_key(&id) {
            return;
        }
        let weak = store.clone();
        let timer_id = id.clone();
        let task = handle.spawn(async move {
            sleep(REMOVE_DELAY).await;
            if let Some(store) = weak.upgrade() {
                store.dispatch(Action::Remove(Some(timer_id)));
            }
        });
        pending.insert(id, task);
    }

    fn cancel(&self, id: &ToastId) {
        if let Some(task) = lock(&self.pending).remove(id) {
            task.abort();
        }
    }

    fn cancel_all(&self) {
        for (_, task) in lock(&self.pending).drain() {
            task.abort();
        }
    }
}

impl Drop for RemovalQueue {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// One-shot auto-dismiss timers, recomputed wholesale whenever the observed
/// toast list or pause state changes.
pub struct CountdownScheduler {
    handle: Option<Handle>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Default for CountdownScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handle: Handle::try_current().ok(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Cancel every outstanding countdown and re-arm from the given state.
    ///
    /// A toast whose resolved duration has already elapsed is dismissed
    /// immediately (still through dispatch); an unbounded duration never
    /// arms. Re-running with unchanged inputs re-arms at the same deadline,
    /// so the observable dismiss time does not drift.
    pub fn reconcile(&self, store: &WeakStore, state: &State, defaults: &DefaultToastOptions) {
        let mut expired = Vec::new();
        {
            let mut tasks = lock(&self.tasks);
            for task in tasks.drain(..) {
                task.abort();
            }
            // While paused no countdown runs; EndPause triggers the re-arm.
            if state.paused_at.is_some() {
                return;
            }
            let runtime = Handle::try_current().ok().or_else(|| self.handle.clone());
            let now = Instant::now();
            for toast in &state.toasts {
                let merged = defaults.merge(toast);
                let Some(deadline) = merged.dismiss_deadline() else {
                    continue;
                };
                if deadline <= now {
                    if toast.visible {
                        expired.push(toast.id.clone());
                    }
                    continue;
                }
                let Some(handle) = &runtime else {
                    continue;
                };
                let weak = store.clone();
                let id = toast.id.clone();
                tasks.push(handle.spawn(async move {
                    sleep_until(deadline).await;
                    if let Some(store) = weak.upgrade() {
                        store.dispatch(Action::Dismiss(Some(id)));
                    }
                }));
            }
        }
        // Dispatch after releasing the task list: these dismissals broadcast,
        // and the broadcast re-enters reconcile.
        if let Some(store) = store.upgrade() {
            for id in expired {
                debug!(toast_id = %id, "duration elapsed, dismissing");
                store.dispatch(Action::Dismiss(Some(id)));
            }
        }
    }

    /// Cancel every outstanding countdown.
    pub fn clear(&self) {
        for task in lock(&self.tasks).drain(..) {
            task.abort();
        }
    }
}

impl Drop for CountdownScheduler {
    fn drop(&mut self) {
        self.clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
