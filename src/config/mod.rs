//! Container configuration loaded from an optional TOML file plus
//! `TOASTKIT`-prefixed environment overrides. This is host-application
//! plumbing: the resolved values feed straight into
//! [`crate::toaster::ToasterOptions`].

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::Result;
use crate::error::Error as ToastError;
use crate::options::{DefaultToastOptions, TypeOptions};
use crate::toaster::ToasterOptions;
use crate::types::{Position, ToastType};

mod defaults;
mod raw;

#[derive(Debug, Clone)]
pub struct Config {
    pub position: Position,
    pub gutter: f32,
    pub reverse_order: bool,
    pub stacked: bool,
    /// Global duration override, above built-in per-type defaults.
    pub global_duration: Option<Duration>,
    /// Per-type duration overrides.
    pub durations: HashMap<ToastType, Duration>,
}

impl Config {
    /// Load configuration from a file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be parsed, when
    /// environment overrides are invalid, or when the resulting values fail
    /// validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = raw::load(path).map_err(ToastError::from)?;
        raw.validate_and_build()
    }

    #[must_use]
    pub fn toaster_options(&self) -> ToasterOptions {
        let mut toast_options = DefaultToastOptions {
            duration: self.global_duration,
            ..DefaultToastOptions::default()
        };
        for (toast_type, duration) in &self.durations {
            toast_options.overrides.insert(
                *toast_type,
                TypeOptions {
                    duration: Some(*duration),
                    ..TypeOptions::default()
                },
            );
        }
        ToasterOptions {
            default_position: self.position,
            gutter: self.gutter,
            reverse_order: self.reverse_order,
            stacked: self.stacked,
            toast_options,
        }
    }
}
