//! Prometheus metrics for ledgerly-server.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Database query duration histogram by operation.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "ledgerly_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Webhook batch counter by outcome.
pub static WEBHOOK_BATCHES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ledgerly_webhook_batches_total",
        "Total number of classification webhook deliveries",
        &["outcome"] // accepted, rejected
    )
    .expect("Failed to register webhook_batches_total")
});

/// Webhook event counter by outcome.
pub static WEBHOOK_EVENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ledgerly_webhook_events_total",
        "Total number of classification webhook events",
        &["outcome"] // inserted, invalid
    )
    .expect("Failed to register webhook_events_total")
});

/// Classifier trigger counter by outcome.
pub static CLASSIFIER_TRIGGERS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ledgerly_classifier_triggers_total",
        "Total number of post-upload classification triggers",
        &["outcome"] // sent, failed, skipped
    )
    .expect("Failed to register classifier_triggers_total")
});

/// Render all registered metrics in Prometheus text format.
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    encoder
        .encode_to_string(&prometheus::gather())
        .unwrap_or_default()
}
