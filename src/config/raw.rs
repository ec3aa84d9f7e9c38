use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use humantime::parse_duration;
use serde::Deserialize;
use serde_with::{DeserializeAs, serde_as};

use crate::Result;
use crate::error::ConfigError;
use crate::types::{Position, ToastType};

use super::Config;
use super::defaults::{default_gutter, default_position};

/// Duration values in the file are humantime strings ("4s", "1500ms").
pub(super) struct HumantimeDuration;

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let mut builder = ::config::Config::builder();
    let path = path.as_ref();
    builder = builder.add_source(::config::File::from(path).required(false));
    builder = builder.add_source(
        ::config::Environment::with_prefix("TOASTKIT")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) container: RawContainer,
    #[serde(default)]
    pub(super) durations: RawDurations,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawContainer {
    #[serde(default = "default_position")]
    pub(super) position: String,
    #[serde(default = "default_gutter")]
    pub(super) gutter: f32,
    #[serde(default)]
    pub(super) reverse_order: bool,
    #[serde(default)]
    pub(super) stacked: bool,
}

impl Default for RawContainer {
    fn default() -> Self {
        Self {
            position: default_position(),
            gutter: default_gutter(),
            reverse_order: false,
            stacked: false,
        }
    }
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub(super) struct RawDurations {
    #[serde(default)]
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub(super) global: Option<Duration>,
    #[serde(default)]
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub(super) blank: Option<Duration>,
    #[serde(default)]
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub(super) success: Option<Duration>,
    #[serde(default)]
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub(super) error: Option<Duration>,
    #[serde(default)]
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub(super) loading: Option<Duration>,
    #[serde(default)]
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub(super) custom: Option<Duration>,
}

impl RawConfig {
    pub(super) fn validate_and_build(self) -> Result<Config> {
        let position = Position::from_str(&self.container.position).map_err(|err| {
            ConfigError::InvalidField {
                field: "container.position",
                message: err,
            }
        })?;

        if !self.container.gutter.is_finite() || self.container.gutter < 0.0 {
            return Err(ConfigError::InvalidField {
                field: "container.gutter",
                message: format!("expected a non-negative size, got {}", self.container.gutter),
            }
            .into());
        }

        let mut durations = HashMap::new();
        for (toast_type, value) in [
            (ToastType::Blank, self.durations.blank),
            (ToastType::Success, self.durations.success),
            (ToastType::Error, self.durations.error),
            (ToastType::Loading, self.durations.loading),
            (ToastType::Custom, self.durations.custom),
        ] {
            if let Some(duration) = value {
                durations.insert(toast_type, duration);
            }
        }

        Ok(Config {
            position,
            gutter: self.container.gutter,
            reverse_order: self.container.reverse_order,
            stacked: self.container.stacked,
            global_duration: self.durations.global,
            durations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::HumantimeDuration;
    use serde::Deserialize;
    use serde_with::serde_as;
    use std::time::Duration;

    #[test]
    fn humantime_duration_parses_strings() {
        #[serde_as]
        #[derive(Deserialize)]
        struct Sample {
            #[serde_as(as = "Option<HumantimeDuration>")]
            duration: Option<Duration>,
        }

        let sample: Sample = match serde_json::from_str(r#"{"duration":"1500ms"}"#) {
            Ok(value) => value,
            Err(err) => panic!("failed to parse sample json: {err}"),
        };
        assert_eq!(sample.duration, Some(Duration::from_millis(1500)));
    }
}
