use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

/// Unique identifier of a toast. Callers may supply their own or receive a
/// generated one from the show operations.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToastId(String);

impl ToastId {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ToastId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ToastId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastType {
    Blank,
    Success,
    Error,
    Loading,
    Custom,
}

impl ToastType {
    /// Built-in auto-dismiss duration for the type. `None` means the toast is
    /// never auto-dismissed, which is the default for loading spinners.
    #[must_use]
    pub const fn default_duration(self) -> Option<Duration> {
        match self {
            Self::Success => Some(Duration::from_millis(2000)),
            Self::Loading => None,
            Self::Blank | Self::Error | Self::Custom => Some(Duration::from_millis(4000)),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Success => "success",
            Self::Error => "error",
            Self::Loading => "loading",
            Self::Custom => "custom",
        }
    }
}

impl Display for ToastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToastType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blank" => Ok(Self::Blank),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "loading" => Ok(Self::Loading),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown toast type: {other}")),
        }
    }
}

/// Screen region a toast is anchored to. Toasts sharing a bucket stack
/// together; buckets are laid out independently.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Position {
    #[must_use]
    pub const fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopCenter | Self::TopRight)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top-left" => Ok(Self::TopLeft),
            "top-center" => Ok(Self::TopCenter),
            "top-right" => Ok(Self::TopRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-center" => Ok(Self::BottomCenter),
            "bottom-right" => Ok(Self::BottomRight),
            other => Err(format!("unknown position: {other}")),
        }
    }
}

/// Color overrides handed to icon rendering, opaque to the core.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IconTheme {
    pub primary: String,
    pub secondary: String,
}

/// Accessibility attributes passed through to the renderer verbatim.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AriaProps {
    pub role: String,
    #[serde(rename = "aria-live")]
    pub live: String,
}

impl Default for AriaProps {
    fn default() -> Self {
        Self {
            role: "status".to_string(),
            live: "polite".to_string(),
        }
    }
}

/// Toast content: either static text or a function of the toast itself, for
/// dynamic content such as progress counters. Dynamic content is resolved at
/// render time, on every state change.
#[derive(Clone)]
pub enum Message {
    Text(String),
    Dynamic(Arc<dyn Fn(&Toast) -> String + Send + Sync>),
}

impl Message {
    pub fn dynamic(render: impl Fn(&Toast) -> String + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(render))
    }

    #[must_use]
    pub fn resolve(&self, toast: &Toast) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Dynamic(render) => render(toast),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for Message {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Message {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A single notification tracked by the registry.
///
/// `duration` is the per-call override; the effective duration (including
/// per-type and consumer defaults) is resolved downstream by
/// [`crate::options::DefaultToastOptions`], never stored here.
#[derive(Clone, Debug)]
pub struct Toast {
    pub id: ToastId,
    pub toast_type: ToastType,
    pub message: Message,
    pub icon: Option<String>,
    pub icon_theme: Option<IconTheme>,
    pub duration: Option<Duration>,
    /// Cumulative time spent paused; credited back to the countdown.
    pub pause_duration: Duration,
    pub position: Option<Position>,
    pub aria_props: AriaProps,
    pub style: Option<serde_json::Value>,
    pub class_name: Option<String>,
    /// False once dismissal has been requested; drives the exit animation.
    pub visible: bool,
    pub paused: bool,
    /// Measured pixel height, reported back by the renderer after first
    /// layout. Absent until then.
    pub height: Option<f32>,
    pub created_at: Instant,
}

impl Toast {
    #[must_use]
    pub fn new(toast_type: ToastType, message: impl Into<Message>) -> Self {
        Self {
            id: ToastId::random(),
            toast_type,
            message: message.into(),
            icon: None,
            icon_theme: None,
            duration: None,
            pause_duration: Duration::ZERO,
            position: None,
            aria_props: AriaProps::default(),
            style: None,
            class_name: None,
            visible: true,
            paused: false,
            height: None,
            created_at: Instant::now(),
        }
    }

    /// Resolve the message content against the toast's current fields.
    #[must_use]
    pub fn resolve_message(&self) -> String {
        self.message.resolve(self)
    }

    /// Instant at which the countdown expires, accounting for accumulated
    /// pause time. `None` when the duration is unbounded (or so large the
    /// deadline is unrepresentable).
    #[must_use]
    pub fn dismiss_deadline(&self) -> Option<Instant> {
        let duration = self.duration?;
        self.created_at
            .checked_add(duration)
            .and_then(|at| at.checked_add(self.pause_duration))
    }
}

/// Partial patch merged into an existing toast by the `Update` action.
/// Unset fields are retained.
#[derive(Clone, Debug, Default)]
pub struct ToastUpdate {
    pub toast_type: Option<ToastType>,
    pub message: Option<Message>,
    pub icon: Option<String>,
    pub icon_theme: Option<IconTheme>,
    pub duration: Option<Duration>,
    pub position: Option<Position>,
    pub aria_props: Option<AriaProps>,
    pub style: Option<serde_json::Value>,
    pub class_name: Option<String>,
    pub visible: Option<bool>,
    pub height: Option<f32>,
}

impl ToastUpdate {
    #[must_use]
    pub fn message(message: impl Into<Message>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn height(height: f32) -> Self {
        Self {
            height: Some(height),
            ..Self::default()
        }
    }

    pub(crate) fn apply(&self, toast: &mut Toast) {
        if let Some(toast_type) = self.toast_type {
            toast.toast_type = toast_type;
        }
        if let Some(message) = &self.message {
            toast.message = message.clone();
        }
        if let Some(icon) = &self.icon {
            toast.icon = Some(icon.clone());
        }
        if let Some(icon_theme) = &self.icon_theme {
            toast.icon_theme = Some(icon_theme.clone());
        }
        if let Some(duration) = self.duration {
            toast.duration = Some(duration);
        }
        if let Some(position) = self.position {
            toast.position = Some(position);
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
        if let Some(visible) = self.visible {
            toast.visible = visible;
        }
        if let Some(height) = self.height {
            toast.height = Some(height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Message, Position, Toast, ToastId, ToastType, ToastUpdate};
    use std::str::FromStr;
    use std::time::Duration;

    #[test]
    fn toast_type_from_str_accepts_variants() {
        assert_eq!(ToastType::from_str("success"), Ok(ToastType::Success));
        assert_eq!(ToastType::from_str("LOADING"), Ok(ToastType::Loading));
        assert!(ToastType::from_str("fanfare").is_err());
    }

    #[test]
    fn position_round_trips_through_str() {
        for position in [
            Position::TopLeft,
            Position::TopCenter,
            Position::TopRight,
            Position::BottomLeft,
            Position::BottomCenter,
            Position::BottomRight,
        ] {
            assert_eq!(Position::from_str(position.as_str()), Ok(position));
        }
        assert!(Position::from_str("middle").is_err());
    }

    #[test]
    fn loading_has_no_default_duration() {
        assert_eq!(ToastType::Loading.default_duration(), None);
        assert_eq!(
            ToastType::Success.default_duration(),
            Some(Duration::from_millis(2000))
        );
    }

    #[test]
    fn random_ids_differ() {
        assert_ne!(ToastId::random(), ToastId::random());
    }

    #[test]
    fn dynamic_message_sees_current_fields() {
        let mut toast = Toast::new(
            ToastType::Loading,
            Message::dynamic(|t| format!("height is {:?}", t.height)),
        );
        toast.height = Some(42.0);
        assert_eq!(toast.resolve_message(), "height is Some(42.0)");
    }

    #[test]
    fn update_retains_unset_fields() {
        let mut toast = Toast::new(ToastType::Blank, "hello");
        toast.height = Some(50.0);
        let patch = ToastUpdate::message("bye");
        patch.apply(&mut toast);
        assert_eq!(toast.resolve_message(), "bye");
        assert_eq!(toast.height, Some(50.0));
        assert!(toast.visible);
    }

    #[test]
    fn unbounded_duration_has_no_deadline() {
        let toast = Toast::new(ToastType::Loading, "working");
        assert!(toast.dismiss_deadline().is_none());

        let mut capped = Toast::new(ToastType::Blank, "hi");
        capped.duration = Some(Duration::MAX);
        assert!(capped.dismiss_deadline().is_none());
    }
}
