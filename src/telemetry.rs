use crate::config::TelemetryConfig;
use tracing_subscriber::filter::{LevelFilter, ParseError};
use tracing_subscriber::EnvFilter;

const CRATE_TARGET: &str = "land_valuation";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("failed to install the log subscriber: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the global subscriber. A non-empty `RUST_LOG` replaces the
/// configured level.
///
/// Output goes to stderr so that JSON valuation reports on stdout stay clean.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => build_filter(&directives)?,
        _ => build_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

/// A bare level such as `debug` applies to this crate, with dependencies held
/// at `warn`. Anything else is parsed as a directive list.
fn build_filter(spec: &str) -> Result<EnvFilter, TelemetryError> {
    let spec = spec.trim();
    let directives = match spec.parse::<LevelFilter>() {
        Ok(LevelFilter::OFF) => "off".to_string(),
        Ok(level) => format!("{CRATE_TARGET}={level},warn"),
        Err(_) => spec.to_string(),
    };

    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::Filter {
        value: directives,
        source,
    })
}
