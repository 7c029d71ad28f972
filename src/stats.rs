//! Usage statistics collection.
//!
//! Process-lifetime counters updated after each successful dispatch: total
//! requests, cumulative latency, and per-category / per-backend tallies.
//! Never persisted - a restart resets everything by design.
//!
//! Thread-safe: scalar counters use atomics; the tally maps sit behind
//! mutexes so concurrent increments are never lost. Latency is accumulated
//! as integer microseconds to avoid floating-point drift in long-running
//! aggregations.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// A tally map that remembers insertion order.
///
/// `HashMap` iteration order is arbitrary, but the most-common-category
/// aggregate breaks ties by first-inserted key, so each entry carries the
/// sequence number of its first appearance.
#[derive(Debug, Default)]
struct OrderedTally {
    entries: HashMap<String, TallyEntry>,
    next_order: u64,
}

#[derive(Debug, Clone, Copy)]
struct TallyEntry {
    order: u64,
    count: u64,
}

impl OrderedTally {
    fn increment(&mut self, key: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.count += 1;
        } else {
            let order = self.next_order;
            self.next_order += 1;
            self.entries
                .insert(key.to_string(), TallyEntry { order, count: 1 });
        }
    }

    fn counts(&self) -> HashMap<String, u64> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.count))
            .collect()
    }

    /// Key with the highest count; ties broken by first insertion.
    fn most_common(&self) -> Option<String> {
        self.entries
            .iter()
            .max_by(|(_, a), (_, b)| a.count.cmp(&b.count).then(b.order.cmp(&a.order)))
            .map(|(k, _)| k.clone())
    }
}

/// Derived view of the collected statistics.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatsSnapshot {
    /// Number of successful dispatches since process start.
    pub total_predictions: u64,
    /// Mean dispatch latency in milliseconds; `0.0` with no requests.
    pub avg_latency_ms: f64,
    /// Successful dispatches per predicted category.
    pub categories_count: HashMap<String, u64>,
    /// Successful dispatches per backend.
    pub service_usage: HashMap<String, u64>,
    /// Most frequent category; ties go to the first-seen key.
    pub most_common_category: Option<String>,
    /// Seconds since the collector was created.
    pub uptime_seconds: f64,
}

/// Process-wide usage statistics collector.
///
/// The single piece of cross-request shared mutable state in the agent.
/// Owned explicitly and injected into the dispatcher - never a hidden
/// global.
///
/// # Panics
///
/// This type and its methods never panic.
#[derive(Debug)]
pub struct StatsCollector {
    start: Instant,
    total_requests: AtomicU64,
    total_latency_us: AtomicU64,
    categories: Mutex<OrderedTally>,
    backends: Mutex<OrderedTally>,
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsCollector {
    /// Create a collector with all counters at zero and uptime starting now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            total_requests: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            categories: Mutex::new(OrderedTally::default()),
            backends: Mutex::new(OrderedTally::default()),
        }
    }

    /// Record one successful dispatch.
    ///
    /// # Arguments
    ///
    /// * `category` - The category the backend predicted.
    /// * `backend` - Wire name of the backend that served the request.
    /// * `latency_ms` - Observed end-to-end dispatch latency.
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn record(&self, category: &str, backend: &str, latency_ms: f64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let latency_us = (latency_ms * 1000.0).max(0.0) as u64;
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);

        if let Ok(mut categories) = self.categories.lock() {
            categories.increment(category);
        }
        if let Ok(mut backends) = self.backends.lock() {
            backends.increment(backend);
        }
    }

    /// Return a derived view of the current counters.
    ///
    /// Never mutates state.
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn snapshot(&self) -> StatsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_latency_us = self.total_latency_us.load(Ordering::Relaxed);

        let avg_latency_ms = if total_requests > 0 {
            (total_latency_us as f64 / 1000.0) / total_requests as f64
        } else {
            0.0
        };

        let (categories_count, most_common_category) = match self.categories.lock() {
            Ok(tally) => (tally.counts(), tally.most_common()),
            Err(_) => (HashMap::new(), None),
        };
        let service_usage = match self.backends.lock() {
            Ok(tally) => tally.counts(),
            Err(_) => HashMap::new(),
        };

        StatsSnapshot {
            total_predictions: total_requests,
            avg_latency_ms,
            categories_count,
            service_usage,
            most_common_category,
            uptime_seconds: self.start.elapsed().as_secs_f64(),
        }
    }
}
