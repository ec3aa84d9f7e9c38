use super::{Action, State};
use crate::types::Toast;

/// The registry keeps at most this many toasts; older entries beyond the cap
/// are silently dropped.
pub const TOAST_LIMIT: usize = 20;

/// Pure state transition. No action fails: unknown ids are no-ops, and
/// nothing here touches timers; the scheduling layer reacts to dispatched
/// actions separately.
#[must_use]
pub fn reduce(state: &State, action: &Action) -> State {
    match action {
        Action::Add(toast) => add(state, toast),
        Action::Upsert(toast) => {
            if state.find(&toast.id).is_some() {
                replace(state, toast)
            } else {
                add(state, toast)
            }
        }
        Action::Update { id, patch } => {
            let mut next = state.clone();
            if let Some(toast) = next.toasts.iter_mut().find(|t| t.id == *id) {
                patch.apply(toast);
            }
            next
        }
        Action::Dismiss(id) => {
            let mut next = state.clone();
            for toast in &mut next.toasts {
                if id.as_ref().is_none_or(|target| toast.id == *target) {
                    toast.visible = false;
                }
            }
            next
        }
        Action::Remove(Some(id)) => {
            let mut next = state.clone();
            next.toasts.retain(|t| t.id != *id);
            next
        }
        Action::Remove(None) => State {
            toasts: Vec::new(),
            paused_at: state.paused_at,
        },
        Action::StartPause(time) => {
            let mut next = state.clone();
            next.paused_at = Some(*time);
            for toast in &mut next.toasts {
                toast.paused = true;
            }
            next
        }
        Action::EndPause(time) => {
            // Without a matching StartPause there is nothing to credit back.
            let Some(paused_at) = state.paused_at else {
                return state.clone();
            };
            let diff = time.saturating_duration_since(paused_at);
            let mut next = state.clone();
            next.paused_at = None;
            for toast in &mut next.toasts {
                toast.paused = false;
                toast.pause_duration += diff;
            }
            next
        }
    }
}

fn add(state: &State, toast: &Toast) -> State {
    let mut toasts = Vec::with_capacity(state.toasts.len() + 1);
    toasts.push(toast.clone());
    // Dropping a stale entry with the same id keeps ids unique even when Add
    // is dispatched directly instead of through Upsert.
    toasts.extend(state.toasts.iter().filter(|t| t.id != toast.id).cloned());
    toasts.truncate(TOAST_LIMIT);
    State {
        toasts,
        paused_at: state.paused_at,
    }
}

fn replace(state: &State, toast: &Toast) -> State {
    let mut next = state.clone();
    for slot in &mut next.toasts {
        if slot.id == toast.id {
            *slot = toast.clone();
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::{TOAST_LIMIT, reduce};
    use crate::store::{Action, State};
    use crate::types::{Toast, ToastType, ToastUpdate};
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::time::Instant;

    fn toast(label: &str) -> Toast {
        let mut t = Toast::new(ToastType::Blank, label);
        t.id = label.into();
        t
    }

    fn state_with(labels: &[&str]) -> State {
        let mut state = State::default();
        for label in labels {
            state = reduce(&state, &Action::Add(toast(label)));
        }
        state
    }

    #[test]
    fn add_prepends_newest_first() {
        let state = state_with(&["a", "b", "c"]);
        let ids: Vec<&str> = state.toasts.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[test]
    fn add_truncates_to_limit_keeping_most_recent() {
        let mut state = State::default();
        for i in 0..(TOAST_LIMIT + 5) {
            state = reduce(&state, &Action::Add(toast(&format!("t{i}"))));
        }
        assert_eq!(state.toasts.len(), TOAST_LIMIT);
        assert_eq!(state.toasts[0].id.as_str(), "t24");
        assert_eq!(state.toasts[TOAST_LIMIT - 1].id.as_str(), "t5");
    }

    #[test]
    fn ids_stay_unique_across_actions() {
        let mut state = state_with(&["a", "b"]);
        state = reduce(&state, &Action::Add(toast("a")));
        state = reduce(&state, &Action::Upsert(toast("b")));
        let ids: HashSet<&str> = state.toasts.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), state.toasts.len());
    }

    #[test]
    fn upsert_replaces_in_place() {
        let state = state_with(&["a", "b", "c"]);
        let mut fresh = toast("b");
        fresh.toast_type = ToastType::Success;
        let next = reduce(&state, &Action::Upsert(fresh));
        assert_eq!(next.toasts.len(), 3);
        assert_eq!(next.toasts[1].id.as_str(), "b");
        assert_eq!(next.toasts[1].toast_type, ToastType::Success);
    }

    #[test]
    fn update_merges_fields_and_keeps_the_rest() {
        let state = state_with(&["a"]);
        let next = reduce(
            &state,
            &Action::Update {
                id: "a".into(),
                patch: ToastUpdate::height(64.0),
            },
        );
        assert_eq!(next.toasts[0].height, Some(64.0));
        assert_eq!(next.toasts[0].resolve_message(), "a");
    }

    #[test]
    fn update_unknown_id_is_a_noop() {
        let state = state_with(&["a"]);
        let next = reduce(
            &state,
            &Action::Update {
                id: "ghost".into(),
                patch: ToastUpdate::height(10.0),
            },
        );
        assert_eq!(next.toasts.len(), 1);
        assert_eq!(next.toasts[0].height, None);
    }

    #[test]
    fn dismiss_one_flips_visible_only_for_target() {
        let state = state_with(&["a", "b"]);
        let next = reduce(&state, &Action::Dismiss(Some("a".into())));
        assert!(next.toasts.iter().find(|t| t.id.as_str() == "a").is_some_and(|t| !t.visible));
        assert!(next.toasts.iter().find(|t| t.id.as_str() == "b").is_some_and(|t| t.visible));
    }

    #[test]
    fn dismiss_all_flips_every_toast() {
        let state = state_with(&["a", "b", "c"]);
        let next = reduce(&state, &Action::Dismiss(None));
        assert!(next.toasts.iter().all(|t| !t.visible));
    }

    #[test]
    fn dismiss_is_idempotent() {
        let state = state_with(&["a"]);
        let once = reduce(&state, &Action::Dismiss(Some("a".into())));
        let twice = reduce(&once, &Action::Dismiss(Some("a".into())));
        assert!(!twice.toasts[0].visible);
        assert_eq!(twice.toasts.len(), once.toasts.len());
    }

    #[test]
    fn remove_deletes_target_and_remove_all_clears() {
        let state = state_with(&["a", "b"]);
        let next = reduce(&state, &Action::Remove(Some("a".into())));
        assert_eq!(next.toasts.len(), 1);
        let cleared = reduce(&next, &Action::Remove(None));
        assert!(cleared.toasts.is_empty());
    }

    #[test]
    fn pause_cycle_credits_elapsed_time() {
        let state = state_with(&["a"]);
        let t0 = Instant::now();
        let paused = reduce(&state, &Action::StartPause(t0));
        assert!(paused.toasts[0].paused);
        assert_eq!(paused.paused_at, Some(t0));

        let resumed = reduce(&paused, &Action::EndPause(t0 + Duration::from_millis(1500)));
        assert!(!resumed.toasts[0].paused);
        assert_eq!(resumed.paused_at, None);
        assert_eq!(resumed.toasts[0].pause_duration, Duration::from_millis(1500));
    }

    #[test]
    fn pause_duration_never_decreases() {
        let mut state = state_with(&["a"]);
        let mut previous = Duration::ZERO;
        let t0 = Instant::now();
        for step in 1..5u64 {
            state = reduce(&state, &Action::StartPause(t0));
            state = reduce(&state, &Action::EndPause(t0 + Duration::from_millis(step * 100)));
            let current = state.toasts[0].pause_duration;
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn end_pause_without_start_is_a_noop() {
        let state = state_with(&["a"]);
        let next = reduce(&state, &Action::EndPause(Instant::now()));
        assert_eq!(next.toasts[0].pause_duration, Duration::ZERO);
        assert_eq!(next.paused_at, None);
    }
}
