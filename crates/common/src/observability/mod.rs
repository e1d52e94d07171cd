//! Tracing bootstrap
//!
//! Library code only emits `tracing` events. Applications embedding the SDK
//! call [`init_tracing`] (or install their own subscriber) once at startup.
//! The filter honours `RUST_LOG` and falls back to the supplied default
//! directive.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Output format for the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Pretty,
    /// Newline-delimited JSON, one object per event
    Json,
}

/// Error returned when a global subscriber is already installed
#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct TracingInitError(String);

/// Install a global `fmt` subscriber filtered by `RUST_LOG`
///
/// # Arguments
/// * `default_directive` - Filter used when `RUST_LOG` is unset (e.g.
///   `"cirrus=info"`)
/// * `format` - Output format
///
/// # Errors
/// Returns [`TracingInitError`] if another global subscriber was already set.
pub fn init_tracing(default_directive: &str, format: LogFormat) -> Result<(), TracingInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let result = match format {
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init()
        }
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init(),
    };

    result.map_err(|err| TracingInitError(err.to_string()))
}
