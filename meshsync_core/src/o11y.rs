//! Process-wide tracing setup.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line, for log shippers.
    #[default]
    Json,
    /// Human-readable lines for local runs.
    Text,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            other => Err(Error::InvalidInput(format!(
                "invalid MESHSYNC_LOG_FORMAT: {other}"
            ))),
        }
    }
}

/// Reads `MESHSYNC_LOG_FORMAT` (default `json`) and installs the global
/// subscriber. Verbosity comes from `RUST_LOG` (default `info`).
#[tracing::instrument(level = "info", skip_all)]
pub fn init_global_from_env() -> Result<()> {
    let format = match std::env::var("MESHSYNC_LOG_FORMAT") {
        Ok(v) if !v.trim().is_empty() => v.parse()?,
        _ => LogFormat::default(),
    };
    init_global(format)
}

#[tracing::instrument(level = "info", skip_all)]
pub fn init_global(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let res = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };
    res.map_err(|e| Error::BackendMessage(format!("tracing already initialized: {e}")))
}
