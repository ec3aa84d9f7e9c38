//! Consumer-side view over a store: merges consumer defaults into each toast,
//! keeps the countdown scheduler reconciled with the observed state, and
//! answers layout queries for the host container.

use std::sync::Arc;

use tokio::time::Instant;

use crate::offset::{self, DEFAULT_GUTTER, OffsetOptions, StackSlot};
use crate::options::DefaultToastOptions;
use crate::scheduler::CountdownScheduler;
use crate::store::{Action, SubscriptionId, ToastStore};
use crate::types::{Position, Toast, ToastId, ToastUpdate};

/// Container-level configuration for one toaster host.
#[derive(Clone, Debug)]
pub struct ToasterOptions {
    /// Bucket for toasts that do not pick their own position.
    pub default_position: Position,
    pub gutter: f32,
    pub reverse_order: bool,
    /// Render each bucket as a collapsed pile that expands on hover.
    pub stacked: bool,
    pub toast_options: DefaultToastOptions,
}

impl Default for ToasterOptions {
    fn default() -> Self {
        Self {
            default_position: Position::TopCenter,
            gutter: DEFAULT_GUTTER,
            reverse_order: false,
            stacked: false,
            toast_options: DefaultToastOptions::default(),
        }
    }
}

/// One rendering consumer of a store. Multiple toasters can observe the same
/// store with different defaults without interfering: merged views are
/// computed here, never written back.
///
/// Dropping the toaster unsubscribes it and cancels its countdown timers.
pub struct Toaster {
    store: ToastStore,
    options: ToasterOptions,
    countdowns: Arc<CountdownScheduler>,
    subscription: SubscriptionId,
}

impl Toaster {
    pub fn new(store: &ToastStore, options: ToasterOptions) -> Self {
        let countdowns = Arc::new(CountdownScheduler::new());
        let weak = store.downgrade();
        let defaults = options.toast_options.clone();
        let reconciler = Arc::clone(&countdowns);
        let subscription = store.subscribe(move |state| {
            reconciler.reconcile(&weak, state, &defaults);
        });
        let toaster = Self {
            store: store.clone(),
            options,
            countdowns,
            subscription,
        };
        // Pick up whatever was shown before this consumer attached.
        toaster.countdowns.reconcile(
            &toaster.store.downgrade(),
            &toaster.store.state(),
            &toaster.options.toast_options,
        );
        toaster
    }

    /// Toaster over the process-wide store.
    #[must_use]
    pub fn shared(options: ToasterOptions) -> Self {
        Self::new(ToastStore::shared(), options)
    }

    #[must_use]
    pub const fn store(&self) -> &ToastStore {
        &self.store
    }

    #[must_use]
    pub const fn options(&self) -> &ToasterOptions {
        &self.options
    }

    /// Current toasts, newest first, with consumer defaults resolved.
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        let state = self.store.state();
        state
            .toasts
            .iter()
            .map(|toast| self.options.toast_options.merge(toast))
            .collect()
    }

    /// Vertical offset for one toast within its position bucket.
    #[must_use]
    pub fn calculate_offset(&self, toast: &Toast) -> f32 {
        offset::calculate_offset(&self.toasts(), toast, &self.offset_options())
    }

    /// Collapsed-stack placements for every visible, measured toast.
    #[must_use]
    pub fn stacked_offsets(&self, collapsed: bool) -> Vec<StackSlot> {
        offset::stacked_offsets(&self.toasts(), collapsed, &self.offset_options())
    }

    /// Report a measured height back to the registry. Also what keeps a toast
    /// alive: an update cancels any pending removal.
    pub fn update_height(&self, id: &ToastId, height: f32) {
        self.store.update(id, ToastUpdate::height(height));
    }

    /// Suspend every countdown, typically on container hover.
    pub fn start_pause(&self) {
        self.store.dispatch(Action::StartPause(Instant::now()));
    }

    /// Resume countdowns, crediting the paused interval back to every toast.
    /// No-op when not paused.
    pub fn end_pause(&self) {
        if self.store.state().paused_at.is_some() {
            self.store.dispatch(Action::EndPause(Instant::now()));
        }
    }

    fn offset_options(&self) -> OffsetOptions {
        OffsetOptions {
            reverse_order: self.options.reverse_order,
            gutter: self.options.gutter,
            default_position: self.options.default_position,
        }
    }
}

impl Drop for Toaster {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
        self.countdowns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{Toaster, ToasterOptions};
    use crate::options::ToastOptions;
    use crate::store::ToastStore;
    use crate::types::ToastType;
    use std::time::Duration;

    #[test]
    fn toasts_come_back_with_resolved_durations() {
        let store = ToastStore::new();
        let toaster = Toaster::new(&store, ToasterOptions::default());
        store.success("ok", ToastOptions::default());
        store.loading("working", ToastOptions::default());

        let toasts = toaster.toasts();
        let duration_of = |ty| {
            toasts
                .iter()
                .find(|t| t.toast_type == ty)
                .and_then(|t| t.duration)
        };
        assert_eq!(
            duration_of(ToastType::Success),
            Some(Duration::from_millis(2000))
        );
        assert_eq!(duration_of(ToastType::Loading), None);
    }

    #[test]
    fn registry_copy_stays_unresolved() {
        let store = ToastStore::new();
        let _toaster = Toaster::new(&store, ToasterOptions::default());
        store.success("ok", ToastOptions::default());
        assert_eq!(store.state().toasts[0].duration, None);
    }

    #[test]
    fn measured_toasts_stack_under_the_default_position() {
        let store = ToastStore::new();
        let toaster = Toaster::new(&store, ToasterOptions::default());
        let first = store.show("first", ToastOptions::default());
        let second = store.show("second", ToastOptions::default());
        toaster.update_height(&first, 50.0);
        toaster.update_height(&second, 40.0);

        let toasts = toaster.toasts();
        let offset_of = |id: &crate::types::ToastId| {
            toasts
                .iter()
                .find(|t| t.id == *id)
                .map(|t| toaster.calculate_offset(t))
        };
        // Newest first: second sits at the top of the stack.
        assert_eq!(offset_of(&second), Some(0.0));
        assert_eq!(offset_of(&first), Some(48.0));
    }

    #[test]
    fn end_pause_without_pause_changes_nothing() {
        let store = ToastStore::new();
        let toaster = Toaster::new(&store, ToasterOptions::default());
        store.show("hi", ToastOptions::default());
        toaster.end_pause();
        let state = store.state();
        assert_eq!(state.paused_at, None);
        assert_eq!(state.toasts[0].pause_duration, Duration::ZERO);
    }

    #[test]
    fn dropping_the_toaster_detaches_it() {
        let store = ToastStore::new();
        let toaster = Toaster::new(&store, ToasterOptions::default());
        drop(toaster);
        // Dispatch after drop must not reach the dead subscription.
        store.show("late", ToastOptions::default());
        assert_eq!(store.state().toasts.len(), 1);
    }
}
