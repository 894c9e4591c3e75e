//! Performance metrics for store and assistant operations
//!
//! Collects telemetry for collection fetches, goals cache behavior, and
//! assistant turns. Fetch metrics are labeled by collection so slow or
//! flaky endpoints can be spotted individually.
//!
//! # Metrics
//!
//! - `store_fetches_started_total`: Counter of fetches started, by collection
//! - `store_fetches_total`: Counter of finished fetches, by collection and outcome
//! - `store_fetch_duration_seconds`: Histogram of fetch duration, by collection and outcome
//! - `store_active_fetches`: Gauge of in-flight collection fetches
//! - `goals_cache_total`: Counter of goals cache lookups, by outcome (hit/miss/refresh)
//! - `assistant_turns_total`: Counter of assistant turns, by outcome
//! - `assistant_assignments_total`: Counter of activity assignments, by outcome
//!
//! # Examples
//!
//! ```
//! use therakit::metrics::FetchMetrics;
//!
//! let metrics = FetchMetrics::new("students");
//! metrics.record_outcome("success");
//! ```

use metrics::{decrement_gauge, histogram, increment_counter, increment_gauge};
use std::cell::Cell;
use std::time::Instant;

/// Metrics collection for a single collection fetch
///
/// Tracks timing and outcome of one REST fetch. Uses interior mutability
/// (Cell) so outcomes can be recorded through immutable references in
/// async contexts.
#[derive(Debug)]
pub struct FetchMetrics {
    /// Collection being fetched (e.g. "students", "sessions")
    collection: &'static str,

    /// When the fetch started
    start: Instant,

    /// Whether an outcome has been recorded, to prevent double-recording
    recorded: Cell<bool>,
}

impl FetchMetrics {
    /// Creates a metrics tracker for a collection fetch
    ///
    /// Increments the started counter and the active-fetch gauge.
    ///
    /// # Examples
    ///
    /// ```
    /// use therakit::metrics::FetchMetrics;
    ///
    /// let metrics = FetchMetrics::new("sessions");
    /// assert_eq!(metrics.collection(), "sessions");
    /// ```
    pub fn new(collection: &'static str) -> Self {
        increment_counter!("store_fetches_started_total", "collection" => collection);
        increment_gauge!("store_active_fetches", 1.0, "collection" => collection);

        Self {
            collection,
            start: Instant::now(),
            recorded: Cell::new(false),
        }
    }

    /// Records the fetch outcome ("success" or "failure")
    ///
    /// Records duration and the finished counter, and releases the
    /// active-fetch gauge. Subsequent calls are ignored.
    pub fn record_outcome(&self, outcome: &str) {
        if self.recorded.get() {
            return;
        }
        self.recorded.set(true);

        let duration = self.start.elapsed();

        histogram!(
            "store_fetch_duration_seconds",
            duration.as_secs_f64(),
            "collection" => self.collection,
            "outcome" => outcome.to_string()
        );

        increment_counter!(
            "store_fetches_total",
            "collection" => self.collection,
            "outcome" => outcome.to_string()
        );

        decrement_gauge!("store_active_fetches", 1.0, "collection" => self.collection);
    }

    /// Returns the collection label
    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// Returns elapsed time since the fetch started
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for FetchMetrics {
    /// Keeps the active-fetch gauge accurate even when no outcome was
    /// recorded (for example, a panic mid-fetch).
    fn drop(&mut self) {
        if !self.recorded.get() {
            decrement_gauge!("store_active_fetches", 1.0, "collection" => self.collection);
        }
    }
}

/// Records a goals cache lookup outcome ("hit", "miss", or "refresh").
pub fn record_goals_cache(outcome: &str) {
    increment_counter!("goals_cache_total", "outcome" => outcome.to_string());
}

/// Records an assistant turn outcome ("success", "failure", or "rejected").
pub fn record_assistant_turn(outcome: &str) {
    increment_counter!("assistant_turns_total", "outcome" => outcome.to_string());
}

/// Records an activity assignment outcome ("assigned", "duplicate",
/// "rejected", or "failure").
pub fn record_assignment(outcome: &str) {
    increment_counter!("assistant_assignments_total", "outcome" => outcome.to_string());
}

/// Initializes the metrics exporter for Prometheus
///
/// When the `prometheus` feature is enabled, this function sets up the
/// Prometheus metrics exporter to expose metrics on the standard
/// Prometheus endpoint. When disabled, it's a no-op.
///
/// # Examples
///
/// ```
/// use therakit::metrics::init_metrics_exporter;
///
/// init_metrics_exporter();
/// ```
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}
