//! Tracing subscriber setup for host processes
//!
//! The library crates only emit `tracing` events; a binary embedding the
//! client calls [`init_tracing`] once at startup.

use storedesk_domain::{Result, RpcError};
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per event, for log aggregation
    Json,
}

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
///
/// # Errors
/// Returns `RpcError::Config` if the filter directives are invalid or a
/// global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref())?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };

    installed.map_err(|e| RpcError::config(format!("Failed to install tracing subscriber: {e}")))
}

fn build_filter(directives: Option<&str>) -> Result<EnvFilter> {
    match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| RpcError::config(format!("Invalid RUST_LOG directives: {e}"))),
        None => Ok(EnvFilter::new(DEFAULT_FILTER)),
    }
}
