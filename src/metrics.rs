//! Prometheus metrics for sweepstake generation and refresh cycles.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};

use crate::allocation::AllocationPolicy;

// === Metric Name Constants ===

/// Sweepstakes generated counter metric name.
pub const METRIC_SWEEPSTAKES_GENERATED: &str = "sweepstakes_generated_total";
/// Refresh cycles counter metric name.
pub const METRIC_REFRESH_CYCLES: &str = "refresh_cycles_total";
/// Refresh failures counter metric name.
pub const METRIC_REFRESH_FAILURES: &str = "refresh_failures_total";
/// Vanished selections counter metric name.
pub const METRIC_SELECTIONS_VANISHED: &str = "selections_vanished_total";
/// Refresh latency metric name.
pub const METRIC_REFRESH_LATENCY: &str = "refresh_latency_ms";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(
        METRIC_SWEEPSTAKES_GENERATED,
        "Sweepstakes generated, labelled by allocation policy"
    );
    describe_counter!(METRIC_REFRESH_CYCLES, "Completed refresh cycles");
    describe_counter!(METRIC_REFRESH_FAILURES, "Refresh cycles that failed");
    describe_counter!(
        METRIC_SELECTIONS_VANISHED,
        "Assignments whose selection vanished from the market"
    );
    describe_histogram!(
        METRIC_REFRESH_LATENCY,
        "End-to-end refresh latency in milliseconds"
    );
}

/// Record a generated sweepstake.
pub fn record_sweepstake_generated(policy: AllocationPolicy) {
    counter!(METRIC_SWEEPSTAKES_GENERATED, "policy" => policy.to_string()).increment(1);
}

/// Record a completed refresh and its latency.
pub fn record_refresh(elapsed: Duration) {
    counter!(METRIC_REFRESH_CYCLES).increment(1);
    histogram!(METRIC_REFRESH_LATENCY).record(elapsed.as_secs_f64() * 1000.0);
}

/// Record a failed refresh cycle.
pub fn record_refresh_failure() {
    counter!(METRIC_REFRESH_FAILURES).increment(1);
}

/// Record assignments that lost their market selection this cycle.
pub fn record_selections_vanished(count: usize) {
    if count > 0 {
        counter!(METRIC_SELECTIONS_VANISHED).increment(count as u64);
    }
}
