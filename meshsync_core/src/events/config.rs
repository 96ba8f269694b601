use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

/// What the listener does when decoding or handling a single event fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFailurePolicy {
    /// Abort the iteration without advancing the cursor, back off and re-fetch
    /// from the last persisted cursor.
    #[default]
    Retry,
    /// Log the failure and advance the cursor past the event.
    Skip,
}

impl FromStr for EventFailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retry" => Ok(Self::Retry),
            "skip" => Ok(Self::Skip),
            other => Err(Error::InvalidInput(format!(
                "unknown failure policy {other:?} (expected retry or skip)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Idle wait after a poll returned no events.
    pub poll_interval: Duration,
    /// Wait after a failed iteration.
    pub error_backoff: Duration,
    /// When set, consecutive failures double the backoff up to this cap.
    pub max_error_backoff: Option<Duration>,
    pub failure_policy: EventFailurePolicy,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            error_backoff: Duration::from_secs(30),
            max_error_backoff: None,
            failure_policy: EventFailurePolicy::Retry,
        }
    }
}

impl ListenerConfig {
    /// Reads overrides from `MESHSYNC_POLL_INTERVAL_MS`,
    /// `MESHSYNC_ERROR_BACKOFF_MS`, `MESHSYNC_MAX_ERROR_BACKOFF_MS` and
    /// `MESHSYNC_FAILURE_POLICY`. Unset variables keep their defaults.
    #[tracing::instrument(level = "debug")]
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(ms) = env_millis("MESHSYNC_POLL_INTERVAL_MS")? {
            cfg.poll_interval = ms;
        }
        if let Some(ms) = env_millis("MESHSYNC_ERROR_BACKOFF_MS")? {
            cfg.error_backoff = ms;
        }
        cfg.max_error_backoff = env_millis("MESHSYNC_MAX_ERROR_BACKOFF_MS")?;
        if let Ok(policy) = std::env::var("MESHSYNC_FAILURE_POLICY") {
            cfg.failure_policy = policy.parse()?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    #[tracing::instrument(level = "debug")]
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidInput("poll_interval must be > 0".to_string()));
        }
        if self.error_backoff.is_zero() {
            return Err(Error::InvalidInput("error_backoff must be > 0".to_string()));
        }
        if let Some(max) = self.max_error_backoff {
            if max < self.error_backoff {
                return Err(Error::InvalidInput(
                    "max_error_backoff must be >= error_backoff".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Wait before the next attempt after `consecutive_failures` failed
    /// iterations in a row (1 for the first failure).
    pub fn backoff(&self, consecutive_failures: u32) -> Duration {
        let Some(max) = self.max_error_backoff else {
            return self.error_backoff;
        };
        let shift = consecutive_failures.saturating_sub(1).min(31);
        let base = self.error_backoff.as_millis();
        let ms = base.saturating_mul(1u128 << shift).min(max.as_millis());
        Duration::from_millis(ms as u64)
    }
}

fn env_millis(name: &str) -> Result<Option<Duration>> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(|ms| Some(Duration::from_millis(ms)))
        .map_err(|_| Error::InvalidInput(format!("{name} must be a number of milliseconds")))
}
