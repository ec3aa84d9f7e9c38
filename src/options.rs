//! Per-call and consumer-level toast options, and the layered resolution that
//! turns a registry toast into its effective form.
//!
//! Precedence is per-call > per-type > global > built-in default. Resolution
//! happens downstream of the store, so consumers with different defaults
//! never interfere with each other.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::types::{AriaProps, IconTheme, Position, Toast, ToastId, ToastType};

/// Options accepted by every show operation.
#[derive(Clone, Debug, Default)]
pub struct ToastOptions {
    /// Reuse an id to refresh an existing toast instead of adding a new one.
    pub id: Option<ToastId>,
    pub duration: Option<Duration>,
    pub position: Option<Position>,
    pub icon: Option<String>,
    pub icon_theme: Option<IconTheme>,
    pub aria_props: Option<AriaProps>,
    pub style: Option<Value>,
    pub class_name: Option<String>,
}

impl ToastOptions {
    pub(crate) fn apply(&self, toast: &mut Toast) {
        if let Some(id) = &self.id {
            toast.id = id.clone();
        }
        if let Some(duration) = self.duration {
            toast.duration = Some(duration);
        }
        if let Some(position) = self.position {
            toast.position = Some(position);
        }
        if let Some(icon) = &self.icon {
            toast.icon = Some(icon.clone());
        }
        if let Some(icon_theme) = &self.icon_theme {
            toast.icon_theme = Some(icon_theme.clone());
        }
        if let Some(aria_props) = &self.aria_props {
            toast.aria_props = aria_props.clone();
        }
        if let Some(style) = &self.style {
            toast.style = Some(style.clone());
        }
        if let Some(class_name) = &self.class_name {
            toast.class_name = Some(class_name.clone());
        }
    }
}

/// Defaults applied to every toast of one type.
#[derive(Clone, Debug, Default)]
pub struct TypeOptions {
    pub duration: Option<Duration>,
    pub style: Option<Value>,
    pub class_name: Option<String>,
    pub icon: Option<String>,
    pub icon_theme: Option<IconTheme>,
}

/// Consumer-level defaults, resolved against each toast on read.
#[derive(Clone, Debug, Default)]
pub struct DefaultToastOptions {
    pub duration: Option<Duration>,
    pub style: Option<Value>,
    pub class_name: Option<String>,
    pub overrides: HashMap<ToastType, TypeOptions>,
}

impl DefaultToastOptions {
    #[must_use]
    pub fn with_override(mut self, toast_type: ToastType, options: TypeOptions) -> Self {
        self.overrides.insert(toast_type, options);
        self
    }

    /// Produce the effective toast: duration, style, class and icon fields
    /// filled in by precedence. The registry copy is never mutated.
    #[must_use]
    pub fn merge(&self, toast: &Toast) -> Toast {
        let per_type = self.overrides.get(&toast.toast_type);
        let mut merged = toast.clone();

        merged.duration = toast
            .duration
            .or_else(|| per_type.and_then(|o| o.duration))
            .or(self.duration)
            .or_else(|| toast.toast_type.default_duration());

        let base = merge_styles(self.style.as_ref(), per_type.and_then(|o| o.style.as_ref()));
        merged.style = merge_styles(base.as_ref(), toast.style.as_ref());

        merged.class_name = toast
            .class_name
            .clone()
            .or_else(|| per_type.and_then(|o| o.class_name.clone()))
            .or_else(|| self.class_name.clone());

        merged.icon = toast
            .icon
            .clone()
            .or_else(|| per_type.and_then(|o| o.icon.clone()));
        merged.icon_theme = toast
            .icon_theme
            .clone()
            .or_else(|| per_type.and_then(|o| o.icon_theme.clone()));

        merged
    }
}

/// Shallow merge of two style layers. JSON objects merge key-wise with the
/// overriding layer winning; any other value replaces the base wholesale.
fn merge_styles(base: Option<&Value>, over: Option<&Value>) -> Option<Value> {
    match (base, over) {
        (Some(Value::Object(base)), Some(Value::Object(over))) => {
            let mut merged = base.clone();
            merged.extend(over.clone());
            Some(Value::Object(merged))
        }
        (_, Some(over)) => Some(over.clone()),
        (Some(base), None) => Some(base.clone()),
        (None, None) => None,
    }
}
