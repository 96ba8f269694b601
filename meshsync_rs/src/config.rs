use std::time::Duration;

use crate::error::{MeshError, MeshErrorKind};

/// Connection settings for the Data Mesh Manager API.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://api.datamesh-manager.com`.
    pub host: String,
    pub api_key: Option<String>,
    /// Per-request timeout. This is also the upper bound of a single event poll.
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Reads `MESHSYNC_HOST` (required), `MESHSYNC_API_KEY` and
    /// `MESHSYNC_HTTP_TIMEOUT_SECS` (default 30).
    #[tracing::instrument(level = "debug")]
    pub fn from_env() -> Result<Self, MeshError> {
        let host = std::env::var("MESHSYNC_HOST")
            .map_err(|_| config_error("MESHSYNC_HOST is required"))?;
        let api_key = std::env::var("MESHSYNC_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let timeout_secs = match std::env::var("MESHSYNC_HTTP_TIMEOUT_SECS") {
            Ok(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| config_error("MESHSYNC_HTTP_TIMEOUT_SECS must be a number"))?,
            Err(_) => 30,
        };

        let cfg = Self {
            host,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    #[tracing::instrument(level = "debug")]
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.host.trim().is_empty() {
            return Err(config_error("host is empty"));
        }
        if !(self.host.starts_with("http://") || self.host.starts_with("https://")) {
            return Err(config_error("host must start with http:// or https://"));
        }
        if self.timeout.is_zero() {
            return Err(config_error("timeout must be > 0"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> MeshError {
    MeshError::new(MeshErrorKind::Config, None, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_host() {
        assert!(
            ClientConfig::new("https://api.datamesh-manager.com")
                .validate()
                .is_ok()
        );
        assert!(ClientConfig::new("").validate().is_err());
        assert!(ClientConfig::new("api.datamesh-manager.com").validate().is_err());
    }

    #[test]
    fn debug_output_hides_the_api_key() {
        let cfg = ClientConfig::new("https://example.com").with_api_key("secret");
        assert!(!format!("{cfg:?}").contains("secret"));
    }
}
