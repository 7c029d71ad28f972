//! Runtime configuration for the routing agent.
//!
//! All values come from environment variables with documented defaults, so
//! the agent starts with zero configuration in local development and is
//! fully overridable in deployment.
//!
//! ## Environment Variables
//!
//! - `AGENT_HOST`: bind address (default `0.0.0.0`)
//! - `AGENT_PORT`: bind port (default `8003`)
//! - `FAST_LEXICAL_URL`: fast lexical backend base URL (default `http://localhost:8000`)
//! - `NEURAL_MULTILINGUAL_URL`: neural backend base URL (default `http://localhost:8001`)
//! - `REQUEST_TIMEOUT_SECS`: outbound classification call timeout (default `30`)
//! - `HEALTH_TIMEOUT_SECS`: per-probe health check timeout (default `2`)

use crate::{AgentError, Backend};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bind address: all interfaces.
fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default bind port.
fn default_port() -> u16 {
    8003
}

/// Default fast lexical backend base URL.
fn default_fast_lexical_url() -> String {
    "http://localhost:8000".to_string()
}

/// Default neural multilingual backend base URL.
fn default_neural_multilingual_url() -> String {
    "http://localhost:8001".to_string()
}

/// Default outbound classification timeout: 30 seconds.
fn default_request_timeout_secs() -> u64 {
    30
}

/// Default health probe timeout: 2 seconds.
fn default_health_timeout_secs() -> u64 {
    2
}

/// Agent runtime configuration.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentConfig {
    /// IP address or hostname to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port the agent listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL of the fast lexical classification service.
    #[serde(default = "default_fast_lexical_url")]
    pub fast_lexical_url: String,
    /// Base URL of the neural multilingual classification service.
    #[serde(default = "default_neural_multilingual_url")]
    pub neural_multilingual_url: String,
    /// Timeout for a single outbound classification call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Timeout for a single health probe, in seconds.
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            fast_lexical_url: default_fast_lexical_url(),
            neural_multilingual_url: default_neural_multilingual_url(),
            request_timeout_secs: default_request_timeout_secs(),
            health_timeout_secs: default_health_timeout_secs(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if a numeric variable is set but
    /// unparsable, so misconfiguration surfaces at startup.
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn from_env() -> Result<Self, AgentError> {
        let host = std::env::var("AGENT_HOST").unwrap_or_else(|_| default_host());
        let port = parse_env_var("AGENT_PORT", default_port())?;
        let fast_lexical_url =
            std::env::var("FAST_LEXICAL_URL").unwrap_or_else(|_| default_fast_lexical_url());
        let neural_multilingual_url = std::env::var("NEURAL_MULTILINGUAL_URL")
            .unwrap_or_else(|_| default_neural_multilingual_url());
        let request_timeout_secs =
            parse_env_var("REQUEST_TIMEOUT_SECS", default_request_timeout_secs())?;
        let health_timeout_secs =
            parse_env_var("HEALTH_TIMEOUT_SECS", default_health_timeout_secs())?;

        Ok(Self {
            host,
            port,
            fast_lexical_url,
            neural_multilingual_url,
            request_timeout_secs,
            health_timeout_secs,
        })
    }

    /// Base URL for the given backend.
    pub fn backend_url(&self, backend: Backend) -> &str {
        match backend {
            Backend::FastLexical => &self.fast_lexical_url,
            Backend::NeuralMultilingual => &self.neural_multilingual_url,
        }
    }

    /// Outbound classification call timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Health probe timeout.
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}

/// Parse an optional environment variable, keeping the default when unset.
fn parse_env_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AgentError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AgentError::Config(format!("{name} is not a valid value: {raw:?}"))),
        Err(_) => Ok(default),
    }
}
