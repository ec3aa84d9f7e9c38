use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

use crate::Result;
use crate::error::Error;

const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber with an optional explicit filter and
/// a conditional JSON layer.
///
/// Filter precedence: explicit argument, then `RUST_LOG`, then `info`.
///
/// # Errors
///
/// Returns an error if no candidate filter parses, if JSON output is requested
/// without the `json-logs` feature, or if a global subscriber is already set.
pub fn init_tracing(explicit_filter: Option<&str>, use_json: bool) -> Result<()> {
    let filter = build_filter(explicit_filter)?;

    #[cfg(feature = "json-logs")]
    if use_json {
        let subscriber = Registry::default().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .json()
                .flatten_event(true),
        );
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|err| Error::Telemetry(err.to_string()))?;
        return Ok(());
    }

    #[cfg(not(feature = "json-logs"))]
    if use_json {
        return Err(Error::Telemetry(
            "binary was built without the `json-logs` feature".to_string(),
        ));
    }

    let subscriber = Registry::default().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true),
    );
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| Error::Telemetry(err.to_string()))
}

fn build_filter(explicit: Option<&str>) -> Result<EnvFilter> {
    let env = std::env::var("RUST_LOG").ok();
    explicit
        .map(str::to_string)
        .into_iter()
        .chain(env)
        .chain([DEFAULT_FILTER.to_string()])
        .find_map(|candidate| EnvFilter::try_new(candidate).ok())
        .ok_or_else(|| Error::Telemetry("invalid log filter".to_string()))
}
