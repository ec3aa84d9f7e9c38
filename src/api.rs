//! Caller-facing operations. Every operation is total: unknown ids are
//! treated as already gone and dismissing an invisible toast changes nothing.
//!
//! The free functions act on the process-wide [`ToastStore::shared`]
//! instance; the inherent methods work against any store, which is what
//! tests and multi-store applications use.

use std::future::Future;

use crate::options::ToastOptions;
use crate::store::{Action, ToastStore};
use crate::types::{Message, Toast, ToastId, ToastType, ToastUpdate};

/// Messages for the three phases of [`ToastStore::promise`].
#[derive(Clone, Debug)]
pub struct PromiseMessages {
    pub loading: Message,
    pub success: Message,
    pub error: Message,
}

impl PromiseMessages {
    pub fn new(
        loading: impl Into<Message>,
        success: impl Into<Message>,
        error: impl Into<Message>,
    ) -> Self {
        Self {
            loading: loading.into(),
            success: success.into(),
            error: error.into(),
        }
    }
}

impl ToastStore {
    /// Show a blank toast; returns its id. Passing an existing id in the
    /// options refreshes that toast in place.
    pub fn show(&self, message: impl Into<Message>, options: ToastOptions) -> ToastId {
        self.emit(ToastType::Blank, message.into(), options)
    }

    pub fn success(&self, message: impl Into<Message>, options: ToastOptions) -> ToastId {
        self.emit(ToastType::Success, message.into(), options)
    }

    pub fn error(&self, message: impl Into<Message>, options: ToastOptions) -> ToastId {
        self.emit(ToastType::Error, message.into(), options)
    }

    pub fn loading(&self, message: impl Into<Message>, options: ToastOptions) -> ToastId {
        self.emit(ToastType::Loading, message.into(), options)
    }

    /// Show a toast whose content is fully caller-controlled, re-rendered
    /// from the toast's current fields on every state change.
    pub fn custom(
        &self,
        render: impl Fn(&Toast) -> String + Send + Sync + 'static,
        options: ToastOptions,
    ) -> ToastId {
        self.emit(ToastType::Custom, Message::dynamic(render), options)
    }

    /// Merge fields into an existing toast; no-op if the id is unknown.
    pub fn update(&self, id: &ToastId, patch: ToastUpdate) {
        self.dispatch(Action::Update {
            id: id.clone(),
            patch,
        });
    }

    /// Dismiss one toast, or all of them when `id` is `None`. The toast
    /// stays in the registry for the removal grace delay so exit animations
    /// can play.
    pub fn dismiss(&self, id: Option<&ToastId>) {
        self.dispatch(Action::Dismiss(id.cloned()));
    }

    /// Remove one toast, or all of them when `id` is `None`, bypassing the
    /// grace delay.
    pub fn remove(&self, id: Option<&ToastId>) {
        self.dispatch(Action::Remove(id.cloned()));
    }

    /// Show a loading toast, await the future, then flip the same toast to
    /// success or error and hand back the outcome.
    pub async fn promise<T, E>(
        &self,
        future: impl Future<Output = Result<T, E>>,
        messages: PromiseMessages,
        options: ToastOptions,
    ) -> Result<T, E> {
        let options = ToastOptions {
            id: Some(options.id.clone().unwrap_or_else(ToastId::random)),
            ..options
        };
        self.loading(messages.loading, options.clone());
        let outcome = future.await;
        match &outcome {
            Ok(_) => self.emit(ToastType::Success, messages.success, options),
            Err(_) => self.emit(ToastType::Error, messages.error, options),
        };
        outcome
    }

    fn emit(&self, toast_type: ToastType, message: Message, options: ToastOptions) -> ToastId {
        let mut toast = Toast::new(toast_type, message);
        options.apply(&mut toast);
        let id = toast.id.clone();
        self.dispatch(Action::Upsert(toast));
        id
    }
}

pub fn show(message: impl Into<Message>, options: ToastOptions) -> ToastId {
    ToastStore::shared().show(message, options)
}

pub fn success(message: impl Into<Message>, options: ToastOptions) -> ToastId {
    ToastStore::shared().success(message, options)
}

pub fn error(message: impl Into<Message>, options: ToastOptions) -> ToastId {
    ToastStore::shared().error(message, options)
}

pub fn loading(message: impl Into<Message>, options: ToastOptions) -> ToastId {
    ToastStore::shared().loading(message, options)
}

pub fn custom(
    render: impl Fn(&Toast) -> String + Send + Sync + 'static,
    options: ToastOptions,
) -> ToastId {
    ToastStore::shared().custom(render, options)
}

pub fn update(id: &ToastId, patch: ToastUpdate) {
    ToastStore::shared().update(id, patch);
}

pub fn dismiss(id: Option<&ToastId>) {
    ToastStore::shared().dismiss(id);
}

pub fn remove(id: Option<&ToastId>) {
    ToastStore::shared().remove(id);
}

pub async fn promise<T, E>(
    future: impl Future<Output = Result<T, E>>,
    messages: PromiseMessages,
    options: ToastOptions,
) -> Result<T, E> {
    ToastStore::shared().promise(future, messages, options).await
}
