//! Backend health aggregation.
//!
//! Probes every configured backend concurrently with a short per-probe
//! timeout and reports each outcome independently. A slow or failing
//! backend can delay the aggregate only by its own (bounded) probe, never
//! fail it: `check_all` always returns an entry for every backend.
//!
//! Health is recomputed on every query and never cached; it does not feed
//! back into routing decisions.

use crate::client::{ClassifierClient, ProbeOutcome};
use crate::Backend;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Health classification of a single backend probe.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The probe returned a success status.
    Healthy,
    /// The probe completed but the backend reported a non-success status.
    Unhealthy,
    /// The probe could not complete (timeout or connection failure).
    Unreachable,
}

impl HealthStatus {
    /// Return the status's lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unreachable => "unreachable",
        }
    }
}

/// Per-backend health report.
///
/// Recomputed on every health query; never cached across queries.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BackendHealth {
    /// Wire name of the probed backend.
    pub name: String,
    /// Probe outcome classification.
    pub status: HealthStatus,
    /// Probe round-trip time; absent when the probe never completed.
    pub response_time_ms: Option<u64>,
}

/// Probe all known backends concurrently.
///
/// The probes are issued fan-out/fan-in, so aggregate latency is bounded by
/// the slowest single probe rather than the sum. Never errors: every
/// configured backend gets an entry whatever its probe did.
///
/// # Panics
///
/// This function never panics.
pub async fn check_all(client: &Arc<dyn ClassifierClient>) -> HashMap<Backend, BackendHealth> {
    let probes = Backend::ALL.map(|backend| {
        let client = Arc::clone(client);
        async move { (backend, client.probe(backend).await) }
    });

    let outcomes = futures::future::join_all(probes).await;

    outcomes
        .into_iter()
        .map(|(backend, outcome)| {
            let health = classify_outcome(backend, outcome);
            (backend, health)
        })
        .collect()
}

/// Translate a raw probe outcome into a [`BackendHealth`] report.
fn classify_outcome(backend: Backend, outcome: ProbeOutcome) -> BackendHealth {
    match outcome {
        ProbeOutcome::Up { response_time_ms } => BackendHealth {
            name: backend.as_str().to_string(),
            status: HealthStatus::Healthy,
            response_time_ms: Some(response_time_ms),
        },
        ProbeOutcome::Degraded {
            status,
            response_time_ms,
        } => {
            warn!(backend = %backend, status, "health probe returned failure status");
            BackendHealth {
                name: backend.as_str().to_string(),
                status: HealthStatus::Unhealthy,
                response_time_ms: Some(response_time_ms),
            }
        }
        ProbeOutcome::Unreachable { reason } => {
            warn!(backend = %backend, reason = %reason, "health probe failed");
            BackendHealth {
                name: backend.as_str().to_string(),
                status: HealthStatus::Unreachable,
                response_time_ms: None,
            }
        }
    }
}
