//! Dispatch orchestration.
//!
//! The request-handling entry point: validates the ticket, runs the routing
//! policy, calls the chosen backend through the classifier client, and
//! shapes the unified response. At most one outbound call per dispatch,
//! and none when validation rejects the ticket early.
//!
//! Statistics are recorded only for successful dispatches; failures leave
//! the counters untouched.

use crate::client::ClassifierClient;
use crate::routing::RoutingPolicy;
use crate::stats::StatsCollector;
use crate::{AgentError, Backend, Language};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// The response contract returned to every caller, regardless of which
/// backend served the request. Callers never need backend-specific
/// knowledge.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UnifiedResponse {
    /// Predicted category label.
    pub category: String,
    /// Prediction confidence in `[0, 1]`.
    pub confidence: f64,
    /// Wire name of the backend that served the request.
    pub model_used: String,
    /// Human-readable routing justification.
    pub routing_reason: String,
    /// Whitespace token count of the ticket text.
    pub text_length: usize,
    /// Detected approximate language of the ticket text.
    pub detected_language: Language,
}

/// Orchestrates one dispatch: policy → backend call → unified response.
///
/// Stateless per request; the injected [`StatsCollector`] is the only
/// cross-request shared state it touches.
///
/// # Panics
///
/// This type and its methods never panic.
pub struct Dispatcher {
    policy: RoutingPolicy,
    client: Arc<dyn ClassifierClient>,
    stats: Arc<StatsCollector>,
}

impl Dispatcher {
    /// Create a dispatcher from its collaborators.
    pub fn new(
        policy: RoutingPolicy,
        client: Arc<dyn ClassifierClient>,
        stats: Arc<StatsCollector>,
    ) -> Self {
        Self {
            policy,
            client,
            stats,
        }
    }

    /// Dispatch one ticket to the appropriate backend.
    ///
    /// An unrecognized `force_model` tag is treated as absent: the automatic
    /// policy applies and a warning is logged. This is a documented fallback,
    /// not silent corruption - the caller asked for something that does not
    /// exist, and the agent still serves the request.
    ///
    /// # Arguments
    ///
    /// * `text` - The raw ticket text.
    /// * `force_model` - Optional caller-supplied backend override tag.
    ///
    /// # Errors
    ///
    /// - [`AgentError::InvalidInput`] for empty or whitespace-only text,
    ///   rejected before any backend call.
    /// - [`AgentError::BackendUnavailable`] when the chosen backend cannot
    ///   be reached.
    /// - [`AgentError::BackendError`] when the backend itself fails.
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub async fn dispatch(
        &self,
        text: &str,
        force_model: Option<&str>,
    ) -> Result<UnifiedResponse, AgentError> {
        if text.trim().is_empty() {
            return Err(AgentError::InvalidInput(
                "ticket text must not be empty".to_string(),
            ));
        }

        let forced = match force_model {
            Some(tag) => {
                let parsed = Backend::from_tag(tag);
                if parsed.is_none() {
                    warn!(tag, "unrecognized forced backend, falling back to policy");
                }
                parsed
            }
            None => None,
        };

        let decision = self.policy.decide(text, forced);
        info!(
            backend = %decision.backend,
            language = %decision.language,
            tokens = decision.token_count,
            reason = %decision.reason,
            "routing ticket"
        );

        let start = Instant::now();
        let classification = self.client.classify(decision.backend, text).await?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        self.stats.record(
            &classification.category,
            &classification.backend_name,
            latency_ms,
        );

        Ok(UnifiedResponse {
            category: classification.category,
            confidence: classification.confidence,
            model_used: classification.backend_name,
            routing_reason: decision.reason,
            text_length: decision.token_count,
            detected_language: decision.language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Classification, ProbeOutcome};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Stub backend that counts calls and answers with a fixed result,
    /// or fails when configured to.
    struct StubClient {
        calls: AtomicU64,
        fail_with_status: Option<u16>,
        unavailable: bool,
    }

    impl StubClient {
        fn ok() -> Self {
            Self {
                calls: AtomicU64::new(0),
                fail_with_status: None,
                unavailable: false,
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                fail_with_status: Some(status),
                ..Self::ok()
            }
        }

        fn down() -> Self {
            Self {
                unavailable: true,
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl ClassifierClient for StubClient {
        async fn classify(
            &self,
            backend: Backend,
            _text: &str,
        ) -> Result<Classification, AgentError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if self.unavailable {
                return Err(AgentError::BackendUnavailable {
                    backend,
                    reason: "connection refused".to_string(),
                });
            }
            if let Some(status) = self.fail_with_status {
                return Err(AgentError::BackendError { backend, status });
            }
            Ok(Classification {
                category: "Billing".to_string(),
                confidence: 0.87,
                backend_name: backend.as_str().to_string(),
            })
        }

        async fn probe(&self, _backend: Backend) -> ProbeOutcome {
            ProbeOutcome::Up { response_time_ms: 1 }
        }
    }

    fn dispatcher_with(client: StubClient) -> (Dispatcher, Arc<StubClient>, Arc<StatsCollector>) {
        let client = Arc::new(client);
        let stats = Arc::new(StatsCollector::new());
        let dispatcher = Dispatcher::new(
            RoutingPolicy::new(),
            Arc::clone(&client) as Arc<dyn ClassifierClient>,
            Arc::clone(&stats),
        );
        (dispatcher, client, stats)
    }

    #[tokio::test]
    async fn test_successful_dispatch_shapes_unified_response() {
        let (dispatcher, _, _) = dispatcher_with(StubClient::ok());
        let response = dispatcher
            .dispatch("my card was charged twice", None)
            .await
            .expect("dispatch must succeed");

        assert_eq!(response.category, "Billing");
        assert_eq!(response.confidence, 0.87);
        assert_eq!(response.model_used, "fast_lexical");
        assert_eq!(response.text_length, 5);
        assert_eq!(response.detected_language, Language::En);
        assert!(response.routing_reason.contains("5 words"));
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_before_any_backend_call() {
        let (dispatcher, client, stats) = dispatcher_with(StubClient::ok());
        let result = dispatcher.dispatch("   \t ", None).await;

        assert!(matches!(result, Err(AgentError::InvalidInput(_))));
        assert_eq!(client.calls.load(Ordering::Relaxed), 0, "no backend call");
        assert_eq!(stats.snapshot().total_predictions, 0, "no stats update");
    }

    #[tokio::test]
    async fn test_forced_backend_is_honored() {
        let (dispatcher, _, _) = dispatcher_with(StubClient::ok());
        let response = dispatcher
            .dispatch("hi", Some("neural_multilingual"))
            .await
            .expect("dispatch must succeed");

        assert_eq!(response.model_used, "neural_multilingual");
        assert_eq!(response.routing_reason, "forced by caller");
    }

    #[tokio::test]
    async fn test_unrecognized_forced_tag_falls_back_to_policy() {
        let (dispatcher, _, _) = dispatcher_with(StubClient::ok());
        let response = dispatcher
            .dispatch("hi", Some("does-not-exist"))
            .await
            .expect("dispatch must succeed");

        // Short text → automatic rule 1, not the bogus override.
        assert_eq!(response.model_used, "fast_lexical");
        assert!(response.routing_reason.contains("short text"));
    }

    #[tokio::test]
    async fn test_backend_error_propagates_and_skips_stats() {
        let (dispatcher, _, stats) = dispatcher_with(StubClient::failing(502));
        let result = dispatcher.dispatch("some ticket text", None).await;

        match result {
            Err(AgentError::BackendError { status, .. }) => assert_eq!(status, 502),
            other => panic!("expected BackendError, got: {other:?}"),
        }
        assert_eq!(stats.snapshot().total_predictions, 0);
    }

    #[tokio::test]
    async fn test_unavailable_backend_surfaces_service_error() {
        let (dispatcher, _, _) = dispatcher_with(StubClient::down());
        let result = dispatcher.dispatch("some ticket text", None).await;

        match result {
            Err(AgentError::BackendUnavailable { backend, .. }) => {
                assert_eq!(backend, Backend::FastLexical);
            }
            other => panic!("expected BackendUnavailable, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_successful_dispatch_records_stats() {
        let (dispatcher, _, stats) = dispatcher_with(StubClient::ok());
        dispatcher
            .dispatch("billing question about my invoice", None)
            .await
            .expect("dispatch must succeed");

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_predictions, 1);
        assert_eq!(snapshot.categories_count.get("Billing"), Some(&1));
        assert_eq!(snapshot.service_usage.get("fast_lexical"), Some(&1));
    }
}
