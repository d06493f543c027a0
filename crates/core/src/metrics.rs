//! Prometheus metrics for core components.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

/// Send attempts total by result.
pub static SENDS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("herald_sends_total", "Total send attempts"),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

/// Send duration in seconds.
pub static SEND_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("herald_send_duration_seconds", "Duration of send attempts")
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0, 60.0]),
        &["result"],
    )
    .unwrap()
});

/// Dispatch runs total by terminal status.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("herald_runs_total", "Total dispatch runs by terminal status"),
        &["status"], // "completed", "cancelled", "quota_exceeded"
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SENDS_TOTAL.clone()),
        Box::new(SEND_DURATION.clone()),
        Box::new(RUNS_TOTAL.clone()),
    ]
}
