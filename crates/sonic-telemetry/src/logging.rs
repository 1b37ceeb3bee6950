//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info,sonic=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, with span context.
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

impl LogFormat {
    /// JSON only when `RUST_ENV` is exactly `production`.
    pub fn for_environment(rust_env: Option<&str>) -> Self {
        match rust_env {
            Some("production") => Self::Json,
            _ => Self::Pretty,
        }
    }

    pub fn from_env() -> Self {
        Self::for_environment(std::env::var("RUST_ENV").ok().as_deref())
    }
}

/// Initialize logging in the format picked by `RUST_ENV`.
pub fn init_logging() -> TelemetryResult<()> {
    init_logging_with(LogFormat::from_env())
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging_with(format: LogFormat) -> TelemetryResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true).with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
    };

    installed.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_follows_rust_env() {
        assert_eq!(LogFormat::for_environment(Some("production")), LogFormat::Json);
        assert_eq!(LogFormat::for_environment(Some("staging")), LogFormat::Pretty);
        assert_eq!(LogFormat::for_environment(None), LogFormat::Pretty);
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_second_init_is_an_error() {
        // Either this call installs the subscriber or another test did.
        let _ = init_logging_with(LogFormat::Pretty);
        let err = init_logging_with(LogFormat::Json).unwrap_err();
        assert!(matches!(err, TelemetryError::LoggingInit(_)));
    }
}
