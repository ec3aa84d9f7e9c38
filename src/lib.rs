#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

//! In-process toast notification core: a registry of transient messages, the
//! action/reducer state machine that evolves it, the auto-dismiss timing
//! subsystem, and the pure stacking math that turns the registry into
//! on-screen offsets.
//!
//! Rendering is deliberately out of scope. A frontend subscribes to a
//! [`store::ToastStore`], reads merged toasts through a [`toaster::Toaster`],
//! reports measured heights back, and draws whatever it likes.

pub mod api;
pub mod config;
pub mod error;
pub mod offset;
pub mod options;
pub mod scheduler;
pub mod store;
pub mod telemetry;
pub mod toaster;
pub mod types;

pub type Result<T> = std::result::Result<T, error::Error>;

pub use api::PromiseMessages;
pub use offset::{OffsetOptions, StackSlot};
pub use options::{DefaultToastOptions, ToastOptions};
pub use store::{Action, State, ToastStore};
pub use toaster::{Toaster, ToasterOptions};
pub use types::{AriaProps, IconTheme, Message, Position, Toast, ToastId, ToastType, ToastUpdate};
