//! Backend routing policy.
//!
//! Maps ticket heuristics (and an optional caller override) to a backend
//! choice with a human-readable justification.
//!
//! ## Rules (first match wins)
//!
//! | # | Condition              | Backend              |
//! |---|------------------------|----------------------|
//! | 1 | `token_count < 10`     | fast lexical         |
//! | 2 | `language != en`       | neural multilingual  |
//! | 3 | `token_count > 25`     | neural multilingual  |
//! | 4 | otherwise              | fast lexical         |
//!
//! The order is a deliberate policy: trivial inputs short-circuit to the
//! cheap backend before language is even considered, non-English content
//! beats length, and length is only a tertiary signal. Reordering changes
//! behavior for overlapping cases - a 5-word French ticket must hit rule 1.

use super::heuristics::{Language, TextSignals};
use crate::Backend;
use serde::Serialize;

/// Default token count below which rule 1 (short text) fires.
fn default_short_text_threshold() -> usize {
    10
}

/// Default token count above which rule 3 (long text) fires.
fn default_long_text_threshold() -> usize {
    25
}

/// The routing decision for a single ticket.
///
/// Created once per request, never mutated. The heuristic fields reflect the
/// actual text even when the backend choice was forced by the caller.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoutingDecision {
    /// The backend chosen to serve this ticket.
    pub backend: Backend,
    /// Human-readable justification for the choice.
    pub reason: String,
    /// Detected approximate language of the ticket text.
    pub language: Language,
    /// Whitespace token count of the ticket text.
    pub token_count: usize,
}

/// Deterministic backend routing policy.
///
/// Stateless and cheap to construct. `decide` is a pure function: no I/O,
/// no backend calls, same output for the same input.
///
/// # Panics
///
/// This type and its methods never panic.
#[derive(Debug, Clone)]
pub struct RoutingPolicy {
    short_text_threshold: usize,
    long_text_threshold: usize,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingPolicy {
    /// Create a policy with the default thresholds (short < 10, long > 25).
    pub fn new() -> Self {
        Self {
            short_text_threshold: default_short_text_threshold(),
            long_text_threshold: default_long_text_threshold(),
        }
    }

    /// Create a policy with custom thresholds.
    ///
    /// # Arguments
    ///
    /// * `short_text_threshold` - token counts below this route fast lexical.
    /// * `long_text_threshold` - token counts above this route neural.
    pub fn with_thresholds(short_text_threshold: usize, long_text_threshold: usize) -> Self {
        Self {
            short_text_threshold,
            long_text_threshold,
        }
    }

    /// Decide which backend should serve a ticket.
    ///
    /// When `forced` is present it always wins, with reason "forced by
    /// caller"; the heuristics are still computed and reported so callers
    /// keep full transparency into what the automatic policy saw.
    ///
    /// # Arguments
    ///
    /// * `text` - The raw ticket text.
    /// * `forced` - Optional caller-supplied backend override.
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn decide(&self, text: &str, forced: Option<Backend>) -> RoutingDecision {
        let signals = TextSignals::analyze(text);

        if let Some(backend) = forced {
            return RoutingDecision {
                backend,
                reason: "forced by caller".to_string(),
                language: signals.language,
                token_count: signals.token_count,
            };
        }

        // Rule 1: very short text → fast lexical path.
        if signals.token_count < self.short_text_threshold {
            return RoutingDecision {
                backend: Backend::FastLexical,
                reason: format!(
                    "short text ({} words), fast lexical path",
                    signals.token_count
                ),
                language: signals.language,
                token_count: signals.token_count,
            };
        }

        // Rule 2: non-English content → multilingual model.
        if signals.language != Language::En {
            return RoutingDecision {
                backend: Backend::NeuralMultilingual,
                reason: format!(
                    "language {} detected, multilingual model",
                    signals.language
                ),
                language: signals.language,
                token_count: signals.token_count,
            };
        }

        // Rule 3: long text → better contextual analysis.
        if signals.token_count > self.long_text_threshold {
            return RoutingDecision {
                backend: Backend::NeuralMultilingual,
                reason: format!(
                    "long text ({} words), multilingual model",
                    signals.token_count
                ),
                language: signals.language,
                token_count: signals.token_count,
            };
        }

        // Rule 4: default.
        RoutingDecision {
            backend: Backend::FastLexical,
            reason: "standard text, default to fast path".to_string(),
            language: signals.language,
            token_count: signals.token_count,
        }
    }
}
