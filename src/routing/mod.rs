//! # Stage: Routing Intelligence
//!
//! ## Responsibility
//! Decide which classification backend should serve each ticket. Short texts
//! take the cheap fast lexical path; detected non-English content goes to the
//! neural multilingual model; long English texts also go neural; everything
//! else defaults to the fast path.
//!
//! ## Guarantees
//! - Deterministic: the same ticket text and forced flag always produce the
//!   same decision.
//! - Total: every string input, including empty, yields a decision - no
//!   errors, no panics.
//! - Pure: no I/O, no backend calls, no shared mutable state.
//! - Precedence-stable: the four rules apply in a fixed order; a 5-word
//!   French ticket hits the short-text rule, not the language rule.
//!
//! ## NOT Responsible For
//! - Calling the backends (that belongs to `client` / `dispatch`)
//! - Backend availability (health never influences routing)
//! - Semantic language identification (heuristic-only by design)

pub mod heuristics;
pub mod policy;

// Re-exports for convenience
pub use heuristics::{detect_language, token_count, Language, TextSignals};
pub use policy::{RoutingDecision, RoutingPolicy};
