//! Backend classifier clients.
//!
//! Provides the [`ClassifierClient`] trait and the production HTTP
//! implementation [`HttpClassifierClient`]. The trait is object-safe so the
//! dispatcher can hold `Arc<dyn ClassifierClient>` and tests can substitute
//! a stub without a network.
//!
//! ## Wire contract
//!
//! - Classification: `POST {base}/predict` with `{ "text": ... }`; success
//!   body `{ "category": ..., "confidence": ..., "model": ... }`. A degraded
//!   payload never fails the call: missing `category` defaults to
//!   `"Unknown"`, missing `confidence` to `0.0`.
//! - Health probe: `GET {base}/health`; any 2xx counts as healthy, the body
//!   is ignored.

use crate::{AgentConfig, AgentError, Backend};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Normalized result of a backend classification call.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Predicted category label.
    pub category: String,
    /// Prediction confidence in `[0, 1]`. `0.0` when the backend omits it.
    pub confidence: f64,
    /// Wire name of the backend that produced the prediction.
    pub backend_name: String,
}

/// Outcome of a single health probe.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Probe returned a success status.
    Up {
        /// Observed round-trip time in milliseconds.
        response_time_ms: u64,
    },
    /// Probe completed but the backend reported a non-success status.
    Degraded {
        /// The status code the backend returned.
        status: u16,
        /// Observed round-trip time in milliseconds.
        response_time_ms: u64,
    },
    /// Probe could not complete (timeout or connection failure).
    Unreachable {
        /// Transport-level failure description.
        reason: String,
    },
}

/// Trait for classification backends.
///
/// Implementations must be thread-safe (`Send + Sync`) and object-safe for
/// dynamic dispatch via `Arc<dyn ClassifierClient>`.
#[async_trait]
pub trait ClassifierClient: Send + Sync {
    /// Send one classification request to the given backend.
    ///
    /// Exactly one outbound call per invocation, bounded by the configured
    /// timeout. Never retried - a failed attempt surfaces immediately.
    ///
    /// # Errors
    ///
    /// - [`AgentError::BackendUnavailable`] when the call cannot complete.
    /// - [`AgentError::BackendError`] when the backend returns non-success.
    /// - [`AgentError::Internal`] when a success body cannot be decoded.
    async fn classify(&self, backend: Backend, text: &str) -> Result<Classification, AgentError>;

    /// Probe the given backend's health endpoint.
    ///
    /// Infallible by design: every failure mode maps to a [`ProbeOutcome`]
    /// variant rather than an error.
    async fn probe(&self, backend: Backend) -> ProbeOutcome;
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// Classification request payload sent to a backend.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

/// Classification response payload from a backend.
///
/// All fields are optional so a degraded backend payload still parses;
/// defaults are applied during normalization.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    category: Option<String>,
    confidence: Option<f64>,
}

/// HTTP classifier client over `reqwest`.
///
/// Base URLs come from [`AgentConfig`]; the classification timeout defaults
/// to 30 seconds and the probe timeout to 2 seconds.
///
/// ## Example
///
/// ```no_run
/// use ticket_router::{AgentConfig, HttpClassifierClient};
///
/// let config = AgentConfig::default();
/// let client = HttpClassifierClient::new(&config);
/// ```
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone)]
pub struct HttpClassifierClient {
    client: reqwest::Client,
    fast_lexical_url: String,
    neural_multilingual_url: String,
    timeout: Duration,
    probe_timeout: Duration,
}

impl HttpClassifierClient {
    /// Create a client from the agent configuration.
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            fast_lexical_url: config.fast_lexical_url.clone(),
            neural_multilingual_url: config.neural_multilingual_url.clone(),
            timeout: config.request_timeout(),
            probe_timeout: config.health_timeout(),
        }
    }

    /// Override the base URL for one backend (test hook).
    pub fn with_base_url(mut self, backend: Backend, url: impl Into<String>) -> Self {
        match backend {
            Backend::FastLexical => self.fast_lexical_url = url.into(),
            Backend::NeuralMultilingual => self.neural_multilingual_url = url.into(),
        }
        self
    }

    /// Override the classification call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the health probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    fn base_url(&self, backend: Backend) -> &str {
        match backend {
            Backend::FastLexical => &self.fast_lexical_url,
            Backend::NeuralMultilingual => &self.neural_multilingual_url,
        }
    }
}

#[async_trait]
impl ClassifierClient for HttpClassifierClient {
    async fn classify(&self, backend: Backend, text: &str) -> Result<Classification, AgentError> {
        let url = format!("{}/predict", self.base_url(backend));

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&PredictRequest { text })
            .send()
            .await
            .map_err(|e| AgentError::BackendUnavailable {
                backend,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::BackendError {
                backend,
                status: status.as_u16(),
            });
        }

        let body: PredictResponse = response.json().await.map_err(|e| {
            AgentError::Internal(format!("undecodable response from {backend}: {e}"))
        })?;

        // A backend that degrades its own payload still yields a prediction.
        Ok(Classification {
            category: body.category.unwrap_or_else(|| "Unknown".to_string()),
            confidence: body.confidence.unwrap_or(0.0),
            backend_name: backend.as_str().to_string(),
        })
    }

    async fn probe(&self, backend: Backend) -> ProbeOutcome {
        let url = format!("{}/health", self.base_url(backend));
        let start = Instant::now();

        match self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => {
                let response_time_ms = start.elapsed().as_millis() as u64;
                let status = response.status();
                if status.is_success() {
                    ProbeOutcome::Up { response_time_ms }
                } else {
                    ProbeOutcome::Degraded {
                        status: status.as_u16(),
                        response_time_ms,
                    }
                }
            }
            Err(e) => ProbeOutcome::Unreachable {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_response_tolerates_missing_fields() {
        let body: PredictResponse =
            serde_json::from_str("{}").expect("empty object must parse");
        assert!(body.category.is_none());
        assert!(body.confidence.is_none());
    }

    #[test]
    fn test_predict_response_tolerates_extra_fields() {
        let json = r#"{"category": "Billing", "confidence": 0.93, "model": "svm", "extra": 1}"#;
        let body: PredictResponse = serde_json::from_str(json).expect("must parse");
        assert_eq!(body.category.as_deref(), Some("Billing"));
        assert_eq!(body.confidence, Some(0.93));
    }

    #[test]
    fn test_with_base_url_targets_one_backend() {
        let client = HttpClassifierClient::new(&AgentConfig::default())
            .with_base_url(Backend::FastLexical, "http://fast:9999");
        assert_eq!(client.base_url(Backend::FastLexical), "http://fast:9999");
        assert_eq!(
            client.base_url(Backend::NeuralMultilingual),
            "http://localhost:8001"
        );
    }

    #[test]
    fn test_client_picks_up_config_timeouts() {
        let config = AgentConfig {
            request_timeout_secs: 7,
            health_timeout_secs: 1,
            ..AgentConfig::default()
        };
        let client = HttpClassifierClient::new(&config);
        assert_eq!(client.timeout, Duration::from_secs(7));
        assert_eq!(client.probe_timeout, Duration::from_secs(1));
    }
}
