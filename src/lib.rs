//! # ticket-router
//!
//! An intelligent routing agent for free-text support tickets.
//!
//! ## Architecture
//!
//! Each incoming ticket flows through a deterministic routing policy that
//! picks one of two classification backends, then through an HTTP client
//! that normalizes the backend's answer into a single response shape:
//!
//! ```text
//! Ticket → heuristics (language, token count)
//!        → policy (fast_lexical | neural_multilingual)
//!        → backend call (30s timeout, fail fast)
//!        → UnifiedResponse (+ usage statistics)
//! ```
//!
//! Backend health is aggregated on demand by concurrent short-timeout probes
//! and never affects routing.

// ── Lint policy ───────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(missing_docs)]

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub mod client;
pub mod config;
pub mod dispatch;
pub mod health;
pub mod routing;
pub mod server;
pub mod stats;

// Re-exports for convenience
pub use client::{Classification, ClassifierClient, HttpClassifierClient};
pub use config::AgentConfig;
pub use dispatch::{Dispatcher, UnifiedResponse};
pub use routing::{Language, RoutingDecision, RoutingPolicy};
pub use stats::StatsCollector;

/// Initialise the global tracing subscriber.
///
/// Reads the `LOG_FORMAT` environment variable to choose output format:
/// - `"json"` - structured JSON output for production log aggregators
/// - anything else (including unset) - human-readable pretty output
///
/// Filter level is controlled by `RUST_LOG` (e.g. `RUST_LOG=info`).
///
/// # Errors
///
/// Returns [`AgentError::Internal`] if the global subscriber has already
/// been set (e.g. by a previous call or a test harness).
///
/// # Panics
///
/// This function never panics.
pub fn init_tracing() -> Result<(), AgentError> {
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let result = match format.as_str() {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .with_current_span(true)
            .try_init(),
        _ => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init(),
    };

    result.map_err(|e| AgentError::Internal(format!("tracing init failed: {e}")))
}

/// The two classification backends the agent routes between.
///
/// Wire names (`fast_lexical`, `neural_multilingual`) appear in forced-model
/// requests, the `model_used` response field, and health report keys.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Cheap TF-IDF-style lexical classifier; fast path for short or
    /// standard English text.
    FastLexical,
    /// Transformer-based multilingual classifier; handles non-English and
    /// long-context tickets.
    NeuralMultilingual,
}

impl Backend {
    /// All configured backends, in reporting order.
    pub const ALL: [Backend; 2] = [Backend::FastLexical, Backend::NeuralMultilingual];

    /// Return the backend's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::FastLexical => "fast_lexical",
            Backend::NeuralMultilingual => "neural_multilingual",
        }
    }

    /// Parse a caller-supplied backend tag.
    ///
    /// Returns `None` for anything unrecognized - the dispatcher treats that
    /// as "no forced backend" rather than guessing.
    pub fn from_tag(tag: &str) -> Option<Backend> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "fast_lexical" => Some(Backend::FastLexical),
            "neural_multilingual" => Some(Backend::NeuralMultilingual),
            _ => None,
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level agent errors.
///
/// Every failure surfaced by the dispatch path maps to a variant here; the
/// HTTP layer translates each variant to a status code and JSON body.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The ticket was rejected before any backend call (empty text).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The chosen backend could not be reached (connection refused, timeout,
    /// DNS failure).
    #[error("backend {backend} unavailable: {reason}")]
    BackendUnavailable {
        /// The backend the agent tried to reach.
        backend: Backend,
        /// Transport-level failure description.
        reason: String,
    },

    /// The backend responded with a non-success status. The status is the
    /// backend's own fault and is propagated as-is to the caller.
    #[error("backend {backend} returned status {status}")]
    BackendError {
        /// The backend that failed.
        backend: Backend,
        /// The HTTP status code the backend returned.
        status: u16,
    },

    /// A configuration value is missing or invalid (e.g. unparsable env var).
    ///
    /// Returned at construction time so misconfiguration surfaces at startup
    /// rather than at the first dispatch.
    #[error("configuration error: {0}")]
    Config(String),

    /// Anything unexpected. Surfaced generically; never leaks internals.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_wire_names() {
        assert_eq!(Backend::FastLexical.as_str(), "fast_lexical");
        assert_eq!(Backend::NeuralMultilingual.as_str(), "neural_multilingual");
    }

    #[test]
    fn test_backend_from_tag_recognizes_both_backends() {
        assert_eq!(Backend::from_tag("fast_lexical"), Some(Backend::FastLexical));
        assert_eq!(
            Backend::from_tag("neural_multilingual"),
            Some(Backend::NeuralMultilingual)
        );
    }

    #[test]
    fn test_backend_from_tag_is_case_insensitive_and_trims() {
        assert_eq!(
            Backend::from_tag("  Fast_Lexical "),
            Some(Backend::FastLexical)
        );
    }

    #[test]
    fn test_backend_from_tag_rejects_unknown_values() {
        assert_eq!(Backend::from_tag("tfidf2"), None);
        assert_eq!(Backend::from_tag(""), None);
        assert_eq!(Backend::from_tag("neural"), None);
    }

    #[test]
    fn test_backend_serializes_snake_case() {
        let json =
            serde_json::to_string(&Backend::NeuralMultilingual).expect("backend must serialize");
        assert_eq!(json, "\"neural_multilingual\"");
    }

    #[test]
    fn test_error_display_names_the_backend() {
        let err = AgentError::BackendUnavailable {
            backend: Backend::FastLexical,
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("fast_lexical"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_backend_error_display_includes_status() {
        let err = AgentError::BackendError {
            backend: Backend::NeuralMultilingual,
            status: 500,
        };
        assert!(err.to_string().contains("500"));
    }
}
